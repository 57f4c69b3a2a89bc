//! Wire bodies exchanged between the workspace client and the relay.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A chat message with role and plain-text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request payload for one chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub messages: Vec<Message>,
    /// JSON-serialized file tree snapshot.
    pub file_tree: String,
}

/// Success payload for one chat turn.
///
/// `actions` stays raw so that entries with unknown tags can be skipped
/// instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub message: String,
    #[serde(default)]
    pub actions: Vec<Value>,
}

/// Failure payload returned with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_file_tree() {
        let request = RelayRequest {
            messages: vec![Message::user("hi")],
            file_tree: "[]".to_string(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "messages": [{"role": "user", "content": "hi"}],
                "fileTree": "[]"
            })
        );
    }

    #[test]
    fn response_defaults_missing_actions() {
        let response: RelayResponse =
            serde_json::from_value(json!({"message": "ok"})).expect("deserialize");
        assert_eq!(response.message, "ok");
        assert!(response.actions.is_empty());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_value::<Message>(json!({"role": "system", "content": "x"}));
        assert!(parsed.is_err());
    }
}
