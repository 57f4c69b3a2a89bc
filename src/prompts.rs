//! System prompt sent upstream with every chat turn.

// Prompt files loaded at compile time
pub const AGENT_PROMPT: &str = include_str!("prompts/agent.txt");
pub const GUIDELINES_PROMPT: &str = include_str!("prompts/guidelines.txt");

/// Build the system prompt around the serialized file tree.
#[must_use]
pub fn build_system_prompt(file_tree: &str) -> String {
    format!(
        "{}\n\nCurrent project context:\n{}\n\n{}",
        AGENT_PROMPT.trim(),
        file_tree.trim(),
        GUIDELINES_PROMPT.trim()
    )
}
