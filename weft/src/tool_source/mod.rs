//! Tool source abstraction: list tools and call a tool.
//!
//! Nodes that use tools (web search in the corrective-retrieval demo, for
//! instance) depend on [`ToolSource`]; the crate ships [`MockToolSource`].

mod mock;

pub use mock::MockToolSource;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::error::NodeError;

/// Tool specification: name, description and JSON Schema for the arguments.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Result of a single tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Errors from listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<ToolSourceError> for NodeError {
    fn from(e: ToolSourceError) -> Self {
        NodeError::ExecutionFailed(e.to_string())
    }
}

/// Tool source: list tools and call one by name with JSON arguments.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}
