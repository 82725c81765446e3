//! Text-generation client abstraction.
//!
//! Nodes that need a model depend on [`LlmClient`]; the crate ships only
//! [`MockLlm`]. Hosted model APIs are left to callers.

mod mock;

pub use mock::MockLlm;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NodeError;
use crate::message::Message;

/// A tool invocation requested by the model.
///
/// Kept in state (e.g. a `tool_calls` field) between the node that asks for
/// tools and the node that runs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name as listed by the `ToolSource`.
    pub name: String,
    /// JSON arguments for the tool.
    pub arguments: Value,
    /// Optional id to match the call with its result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Parses a list field (e.g. `state.get_array("tool_calls")`) into calls.
    pub fn list_from_values(values: &[Value]) -> Result<Vec<ToolCall>, NodeError> {
        values
            .iter()
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| NodeError::InvalidState(format!("tool call: {}", e)))
            })
            .collect()
    }
}

/// One model reply: assistant text and the tool calls it asks for (often none).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Text reply without tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Reply asking for `tool_calls`.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Text-generation client: messages in, assistant text (and tool calls) out.
///
/// Failures surface as `NodeError` and fail the calling node's step; they are
/// not retried by the executor.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, NodeError>;
}
