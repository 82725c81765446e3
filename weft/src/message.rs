//! Conversation message types.
//!
//! Roles: System (usually first in the list), User, Assistant. Stored in
//! state as `{"role": "...", "content": "..."}` objects, typically in an
//! `Append` field such as `messages`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NodeError;

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    /// System prompt; typically placed first in the message list.
    System(String),
    /// User input.
    User(String),
    /// Model reply.
    Assistant(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System(c) | Message::User(c) | Message::Assistant(c) => c,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) => "assistant",
        }
    }

    /// The message as a state value.
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "role": self.role(), "content": self.content() })
    }

    /// Parses a list field (e.g. `state.get_array("messages")`) into messages.
    pub fn list_from_values(values: &[Value]) -> Result<Vec<Message>, NodeError> {
        values
            .iter()
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| NodeError::InvalidState(format!("message: {}", e)))
            })
            .collect()
    }
}
