//! VibeCode workspace: an in-memory file tree, open-file projection, terminal
//! log and agent chat, plus the relay service that forwards chat turns to a
//! hosted chat-completions gateway.

pub mod actions;
pub mod active_file;
pub mod chat;
pub mod config;
pub mod error;
pub mod file_tree;
pub mod gateway;
pub mod logging;
pub mod prompts;
pub mod relay;
pub mod repl;
pub mod terminal;
pub mod workspace;

pub use actions::{ActionReport, AgentAction};
pub use chat::{ChatError, ChatSession, SendRejected, TurnState};
pub use config::Config;
pub use error::{ErrorCategory, GatewayError, RelayError};
pub use file_tree::{FileNode, FileTree, NodeBody, NodeKind, TreeError};
pub use workspace::{TurnReport, Workspace, WorkspaceEvent};
