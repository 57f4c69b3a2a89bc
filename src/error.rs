//! Error types shared by the relay service, the gateway client and the chat client.

use thiserror::Error;

/// Broad category used when logging failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Upstream,
    Network,
    InvalidInput,
    Parse,
}

/// Failures talking to the upstream inference gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway API key is not configured")]
    MissingCredential,
    #[error("gateway returned HTTP {status}")]
    Upstream { status: u16, body: String },
    #[error("gateway request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("gateway response was malformed: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::MissingCredential => ErrorCategory::Configuration,
            GatewayError::Upstream { .. } => ErrorCategory::Upstream,
            GatewayError::Network(_) => ErrorCategory::Network,
            GatewayError::MalformedResponse(_) => ErrorCategory::Parse,
        }
    }
}

/// Failures seen by the workspace when calling the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to reach the relay: {0}")]
    Network(#[from] reqwest::Error),
    #[error("relay returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode relay response: {0}")]
    Decode(String),
    #[error("failed to snapshot the file tree: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl RelayError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::Network(_) => ErrorCategory::Network,
            RelayError::Status { status, .. } if (400..500).contains(status) => {
                ErrorCategory::InvalidInput
            }
            RelayError::Status { .. } => ErrorCategory::Upstream,
            RelayError::Decode(_) | RelayError::Snapshot(_) => ErrorCategory::Parse,
        }
    }

    /// Short text suitable for a transient notification.
    #[must_use]
    pub fn notification(&self) -> String {
        match self {
            RelayError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            RelayError::Network(_) => "Failed to communicate with agent".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_categories() {
        assert_eq!(
            GatewayError::MissingCredential.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            GatewayError::Upstream {
                status: 503,
                body: String::new()
            }
            .category(),
            ErrorCategory::Upstream
        );
        assert_eq!(
            GatewayError::MalformedResponse("no choices".into()).category(),
            ErrorCategory::Parse
        );
    }

    #[test]
    fn relay_status_category_depends_on_code() {
        let bad_request = RelayError::Status {
            status: 400,
            message: "bad".into(),
        };
        let server = RelayError::Status {
            status: 500,
            message: "AI API error".into(),
        };
        assert_eq!(bad_request.category(), ErrorCategory::InvalidInput);
        assert_eq!(server.category(), ErrorCategory::Upstream);
    }

    #[test]
    fn notification_prefers_relay_message() {
        let err = RelayError::Status {
            status: 500,
            message: "AI API error".into(),
        };
        assert_eq!(err.notification(), "AI API error");

        let empty = RelayError::Status {
            status: 502,
            message: "  ".into(),
        };
        assert_eq!(empty.notification(), "relay returned HTTP 502:   ");
    }
}
