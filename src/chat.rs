//! Chat session with the agent.
//!
//! The full transcript is sent on every turn together with a snapshot of the
//! file tree. At most one turn can be in flight; further sends are refused
//! until the pending turn resolves.

use thiserror::Error;

use crate::actions::{AgentAction, decode_actions};
use crate::error::RelayError;
use crate::file_tree::FileTree;
use crate::relay::protocol::{Message, RelayRequest, RelayResponse};

pub const GREETING: &str = "Hi! I'm your AI coding agent. I can help you write code, debug, architect solutions, and more. What would you like to build?";

/// Lifecycle of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    Sending,
}

/// Why a send was refused. A refused send leaves the transcript untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendRejected {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply is already pending")]
    TurnInFlight,
}

/// Errors from a chat turn as seen by the caller.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Rejected(#[from] SendRejected),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl ChatError {
    /// `true` when the send was refused without touching the transcript.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, ChatError::Rejected(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    messages: Vec<Message>,
    state: TurnState,
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session opened with the agent's greeting.
    #[must_use]
    pub fn with_greeting() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            state: TurnState::Idle,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn state(&self) -> TurnState {
        self.state
    }

    #[must_use]
    pub fn is_awaiting_reply(&self) -> bool {
        self.state == TurnState::Sending
    }

    /// Start a turn: append the user message and build the relay request.
    ///
    /// Rejected sends and snapshot failures leave the session untouched.
    pub fn begin_turn(&mut self, text: &str, tree: &FileTree) -> Result<RelayRequest, ChatError> {
        if text.trim().is_empty() {
            return Err(SendRejected::EmptyMessage.into());
        }
        if self.is_awaiting_reply() {
            return Err(SendRejected::TurnInFlight.into());
        }
        let file_tree = tree.to_json().map_err(RelayError::from)?;

        self.messages.push(Message::user(text));
        self.state = TurnState::Sending;
        Ok(RelayRequest {
            messages: self.messages.clone(),
            file_tree,
        })
    }

    /// Resolve the pending turn.
    ///
    /// On success the assistant reply is appended and the decoded actions are
    /// returned. On failure the user message stays in the transcript.
    pub fn finish_turn(
        &mut self,
        outcome: Result<RelayResponse, RelayError>,
    ) -> Result<Vec<AgentAction>, RelayError> {
        self.state = TurnState::Idle;
        let response = outcome?;
        self.messages.push(Message::assistant(response.message));
        Ok(decode_actions(&response.actions))
    }

    /// Give up on the pending turn without a reply.
    ///
    /// The user message stays in the transcript, as on a relay failure.
    pub fn abandon_turn(&mut self) {
        self.state = TurnState::Idle;
    }
}
