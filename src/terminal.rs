//! Append-only terminal log.

/// Ordered terminal output. Lines are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalLog {
    lines: Vec<String>,
}

impl TerminalLog {
    /// Log pre-filled with the banner shown when a workspace opens.
    #[must_use]
    pub fn with_banner() -> Self {
        let mut log = Self::default();
        log.extend(["VibeCode AI Terminal v1.0.0", "Ready to execute code..."]);
        log
    }

    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines appended at or after `index`.
    #[must_use]
    pub fn since(&self, index: usize) -> &[String] {
        self.lines.get(index..).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_extend_preserve_order() {
        let mut log = TerminalLog::default();
        log.append("one");
        log.extend(vec!["two".to_string(), "three".to_string()]);
        log.append(String::from("four"));
        assert_eq!(log.lines(), &["one", "two", "three", "four"]);
    }

    #[test]
    fn banner_has_two_lines() {
        assert!(TerminalLog::default().is_empty());
        let log = TerminalLog::with_banner();
        assert!(!log.is_empty());
        assert_eq!(log.len(), 2);
        assert!(log.lines()[0].starts_with("VibeCode AI Terminal"));
    }

    #[test]
    fn since_returns_tail() {
        let mut log = TerminalLog::with_banner();
        let mark = log.len();
        log.append("new line");
        assert_eq!(log.since(mark), &["new line"]);
        assert!(log.since(100).is_empty());
    }
}
