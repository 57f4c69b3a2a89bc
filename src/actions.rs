//! Agent actions returned by the relay and their effect on the workspace.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::file_tree::{NodeKind, child_path};
use crate::workspace::{Workspace, WorkspaceEvent};

/// A file mutation requested by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentAction {
    CreateFile {
        #[serde(rename = "parentPath")]
        parent_path: String,
        name: String,
    },
    UpdateFile {
        path: String,
        content: String,
    },
}

impl AgentAction {
    /// Path the action targets.
    #[must_use]
    pub fn target_path(&self) -> String {
        match self {
            AgentAction::CreateFile { parent_path, name } => child_path(parent_path, name),
            AgentAction::UpdateFile { path, .. } => path.clone(),
        }
    }
}

/// What happened to each action of a response, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionReport {
    pub applied: Vec<AgentAction>,
    pub skipped: Vec<AgentAction>,
}

impl ActionReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.skipped.is_empty()
    }
}

/// Decode the raw action list of a relay response.
///
/// Entries with an unknown `type` or missing fields are skipped.
#[must_use]
pub fn decode_actions(raw: &[Value]) -> Vec<AgentAction> {
    raw.iter()
        .filter_map(|value| match AgentAction::deserialize(value) {
            Ok(action) => Some(action),
            Err(err) => {
                let kind = value.get("type").and_then(Value::as_str).unwrap_or("<none>");
                tracing::warn!(action_type = kind, error = %err, "skipping agent action");
                None
            }
        })
        .collect()
}

/// Apply `actions` in order, each one fully before the next.
///
/// Every action writes one terminal line. Actions whose target does not
/// resolve leave the tree unchanged and are reported as skipped.
pub fn apply_actions(workspace: &mut Workspace, actions: &[AgentAction]) -> ActionReport {
    let mut report = ActionReport::default();
    for action in actions {
        let applied = match action {
            AgentAction::CreateFile { parent_path, name } => {
                let target = child_path(parent_path, name);
                if workspace.tree().find(parent_path).is_some_and(|node| node.is_folder()) {
                    workspace.handle(WorkspaceEvent::CreateNode {
                        parent_path: parent_path.clone(),
                        name: name.clone(),
                        kind: NodeKind::File,
                    });
                    workspace.terminal_mut().append(format!("Agent created file: {target}"));
                    true
                } else {
                    workspace.terminal_mut().append(format!(
                        "Agent skipped file creation: {target} (no folder at {parent_path})"
                    ));
                    false
                }
            }
            AgentAction::UpdateFile { path, content } => {
                if workspace.tree().find(path).is_some_and(|node| node.is_file()) {
                    workspace.handle(WorkspaceEvent::EditFile {
                        path: path.clone(),
                        content: content.clone(),
                    });
                    workspace.terminal_mut().append(format!("Agent updated file: {path}"));
                    true
                } else {
                    workspace
                        .terminal_mut()
                        .append(format!("Agent skipped update: {path} (no such file)"));
                    false
                }
            }
        };
        if applied {
            report.applied.push(action.clone());
        } else {
            tracing::warn!(target_path = %action.target_path(), "agent action did not resolve");
            report.skipped.push(action.clone());
        }
    }
    report
}
