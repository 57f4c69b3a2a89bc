//! Workspace state: file tree, open file, terminal log and chat session.
//!
//! State changes are expressed as events applied to the previous state.
//! Every tree mutation is followed by revalidation of the open file.

use crate::active_file::{ActiveFile, ActiveFileProjection};
use crate::actions::{ActionReport, AgentAction, apply_actions};
use crate::chat::{ChatError, ChatSession};
use crate::error::RelayError;
use crate::file_tree::{FileTree, NodeKind, TreeError};
use crate::relay::client::RelayTransport;
use crate::relay::protocol::RelayResponse;
use crate::terminal::TerminalLog;

/// A state transition requested by the user or the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Open a file in the editor. Folders are ignored.
    SelectFile { path: String },
    /// Replace a file's content.
    EditFile { path: String, content: String },
    /// Add an empty file or folder under an existing folder.
    CreateNode {
        parent_path: String,
        name: String,
        kind: NodeKind,
    },
    /// Close the open file, if any.
    CloseFile,
    /// Run the open file. Execution is disabled; this only logs.
    RunActiveFile,
    AppendTerminal(Vec<String>),
}

/// Result of a completed chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub reply: String,
    pub actions: ActionReport,
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    tree: FileTree,
    active: ActiveFileProjection,
    terminal: TerminalLog,
    chat: ChatSession,
}

impl Workspace {
    #[must_use]
    pub fn new(tree: FileTree) -> Self {
        Self {
            tree,
            ..Self::default()
        }
    }

    /// Workspace with the starter project, terminal banner and chat greeting.
    #[must_use]
    pub fn starter() -> Self {
        Self {
            tree: FileTree::starter_project(),
            active: ActiveFileProjection::default(),
            terminal: TerminalLog::with_banner(),
            chat: ChatSession::with_greeting(),
        }
    }

    #[must_use]
    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    #[must_use]
    pub fn active_file(&self) -> Option<&ActiveFile> {
        self.active.current()
    }

    #[must_use]
    pub fn terminal(&self) -> &TerminalLog {
        &self.terminal
    }

    pub(crate) fn terminal_mut(&mut self) -> &mut TerminalLog {
        &mut self.terminal
    }

    #[must_use]
    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Produce the next state from this one and `event`.
    #[must_use]
    pub fn apply(mut self, event: WorkspaceEvent) -> Self {
        self.handle(event);
        self
    }

    /// Check a user-requested node before applying [`WorkspaceEvent::CreateNode`].
    pub fn check_new_node(
        &self,
        parent_path: &str,
        name: &str,
        kind: NodeKind,
    ) -> Result<(), TreeError> {
        self.tree.try_insert(parent_path, name, kind).map(|_| ())
    }

    pub(crate) fn handle(&mut self, event: WorkspaceEvent) {
        match event {
            WorkspaceEvent::SelectFile { path } => {
                self.active.select(&self.tree, &path);
            }
            WorkspaceEvent::EditFile { path, content } => {
                self.tree = self.tree.update(&path, &content);
                self.active.refresh(&self.tree);
            }
            WorkspaceEvent::CreateNode {
                parent_path,
                name,
                kind,
            } => {
                self.tree = self.tree.insert(&parent_path, &name, kind);
                self.active.refresh(&self.tree);
            }
            WorkspaceEvent::CloseFile => self.active.clear(),
            WorkspaceEvent::RunActiveFile => self.run_active_file(),
            WorkspaceEvent::AppendTerminal(lines) => self.terminal.extend(lines),
        }
    }

    fn run_active_file(&mut self) {
        let Some(active) = self.active.current() else {
            return;
        };
        let name = active.name.clone();
        tracing::info!(path = %active.path, "run requested; execution is disabled");
        self.terminal.extend([
            format!("\n> Executing {name}..."),
            "Code execution is disabled in this workspace.".to_string(),
            "Execution complete.".to_string(),
        ]);
    }

    /// Run one chat turn against the relay and apply the returned actions.
    ///
    /// Rejected sends leave the workspace untouched. Relay failures keep the
    /// user message in the transcript and return the session to idle.
    pub async fn submit_chat(
        &mut self,
        text: &str,
        transport: &dyn RelayTransport,
    ) -> Result<TurnReport, ChatError> {
        let request = self.chat.begin_turn(text, &self.tree)?;
        tracing::debug!(messages = request.messages.len(), "sending chat turn");

        let pending = PendingTurn::new(&mut self.chat);
        let outcome = transport.exchange(&request).await;
        let actions = pending.finish(outcome).map_err(|err| {
            tracing::warn!(category = ?err.category(), error = %err, "agent turn failed");
            err
        })?;

        let reply = self
            .chat
            .messages()
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();
        let actions = apply_actions(self, &actions);
        Ok(TurnReport { reply, actions })
    }
}

/// Returns the session to idle if a turn is dropped before it resolves.
struct PendingTurn<'a> {
    chat: &'a mut ChatSession,
    settled: bool,
}

impl<'a> PendingTurn<'a> {
    fn new(chat: &'a mut ChatSession) -> Self {
        Self {
            chat,
            settled: false,
        }
    }

    fn finish(
        mut self,
        outcome: Result<RelayResponse, RelayError>,
    ) -> Result<Vec<AgentAction>, RelayError> {
        self.settled = true;
        self.chat.finish_turn(outcome)
    }
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("chat turn dropped before the relay replied");
            self.chat.abandon_turn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::TurnState;
    use crate::file_tree::FileNode;
    use crate::relay::protocol::{Message, RelayRequest};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Never answers.
    struct StalledRelay;

    #[async_trait]
    impl RelayTransport for StalledRelay {
        async fn exchange(&self, _request: &RelayRequest) -> Result<RelayResponse, RelayError> {
            std::future::pending().await
        }
    }

    struct EchoRelay;

    #[async_trait]
    impl RelayTransport for EchoRelay {
        async fn exchange(&self, request: &RelayRequest) -> Result<RelayResponse, RelayError> {
            let last = request.messages.last().map(|m| m.content.clone());
            Ok(RelayResponse {
                message: format!("echo: {}", last.unwrap_or_default()),
                actions: Vec::new(),
            })
        }
    }

    fn select(path: &str) -> WorkspaceEvent {
        WorkspaceEvent::SelectFile {
            path: path.to_string(),
        }
    }

    #[test]
    fn edit_refreshes_open_file_in_same_step() {
        let workspace = Workspace::starter().apply(select("/src/index.js"));
        let workspace = workspace.apply(WorkspaceEvent::EditFile {
            path: "/src/index.js".to_string(),
            content: "console.log(1);".to_string(),
        });
        assert_eq!(
            workspace.tree().find("/src/index.js").and_then(FileNode::content),
            Some("console.log(1);")
        );
        assert_eq!(
            workspace.active_file().map(|file| file.content.as_str()),
            Some("console.log(1);")
        );
    }

    #[test]
    fn selecting_folder_keeps_previous_file() {
        let workspace = Workspace::starter()
            .apply(select("/README.md"))
            .apply(select("/src"));
        assert_eq!(
            workspace.active_file().map(|file| file.path.as_str()),
            Some("/README.md")
        );
    }

    #[test]
    fn create_node_adds_leaf() {
        let workspace = Workspace::starter().apply(WorkspaceEvent::CreateNode {
            parent_path: "/src".to_string(),
            name: "components".to_string(),
            kind: NodeKind::Folder,
        });
        assert!(
            workspace
                .tree()
                .find("/src/components")
                .is_some_and(FileNode::is_folder)
        );
    }

    #[test]
    fn check_new_node_surfaces_tree_errors() {
        let workspace = Workspace::starter();
        assert_eq!(
            workspace.check_new_node("/src", "index.js", NodeKind::File),
            Err(TreeError::AlreadyExists("/src/index.js".to_string()))
        );
        assert_eq!(workspace.check_new_node("/src", "new.js", NodeKind::File), Ok(()));
    }

    #[test]
    fn close_file_clears_projection() {
        let workspace = Workspace::starter()
            .apply(select("/README.md"))
            .apply(WorkspaceEvent::CloseFile);
        assert!(workspace.active_file().is_none());
        assert_eq!(workspace.tree(), &FileTree::starter_project());
    }

    #[test]
    fn run_without_open_file_is_a_no_op() {
        let workspace = Workspace::starter();
        let before = workspace.terminal().clone();
        let workspace = workspace.apply(WorkspaceEvent::RunActiveFile);
        assert_eq!(workspace.terminal(), &before);
    }

    #[test]
    fn run_logs_stub_lines() {
        let workspace = Workspace::starter()
            .apply(select("/src/index.js"))
            .apply(WorkspaceEvent::RunActiveFile);
        assert_eq!(
            workspace.terminal().since(2),
            &[
                "\n> Executing index.js...",
                "Code execution is disabled in this workspace.",
                "Execution complete.",
            ]
        );
    }

    #[test]
    fn append_terminal_extends_log() {
        let workspace = Workspace::new(FileTree::default())
            .apply(WorkspaceEvent::AppendTerminal(vec!["a".into(), "b".into()]));
        assert_eq!(workspace.terminal().lines(), &["a", "b"]);
        assert!(workspace.chat().messages().is_empty());
    }

    #[tokio::test]
    async fn dropped_turn_does_not_block_later_sends() {
        let mut workspace = Workspace::new(FileTree::starter_project());
        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            workspace.submit_chat("hello", &StalledRelay),
        )
        .await;
        assert!(timed_out.is_err());
        assert_eq!(workspace.chat().state(), TurnState::Idle);
        assert_eq!(workspace.chat().messages(), &[Message::user("hello")]);

        let report = workspace
            .submit_chat("again", &EchoRelay)
            .await
            .expect("second turn is accepted");
        assert_eq!(report.reply, "echo: again");
        assert_eq!(workspace.chat().messages().len(), 3);
    }
}
