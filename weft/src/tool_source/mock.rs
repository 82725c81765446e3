//! Mock tool source with canned results.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

type Handler = Box<dyn Fn(&Value) -> Result<String, ToolSourceError> + Send + Sync>;

/// Mock tool source: each registered tool answers through a closure over its arguments.
///
/// **Interaction**: implements `ToolSource`; used by the CLI demos and tests.
#[derive(Default)]
pub struct MockToolSource {
    specs: Vec<ToolSpec>,
    handlers: HashMap<String, Handler>,
}

impl MockToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool that always returns `text`.
    pub fn with_tool(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_handler(name, move |_| Ok(text.clone()))
    }

    /// Registers a tool answered by `f(arguments)`.
    pub fn with_handler<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<String, ToolSourceError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.specs.push(ToolSpec {
            name: name.clone(),
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
        });
        self.handlers.insert(name, Box::new(f));
        self
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.specs.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))?;
        Ok(ToolCallContent {
            text: handler(&arguments)?,
        })
    }
}
