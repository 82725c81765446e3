//! Tool-calling agent: the model either answers or asks for tools; requested
//! calls run in the tools node and their results go back to the model.
//!
//! ```text
//! agent -+-> tools -> agent
//!        +-> END (no tool calls)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use weft::{
    LlmClient, LlmResponse, Message, MockLlm, MockToolSource, Node, NodeContext, NodeError,
    NodeOutput, PartialUpdate, Reducer, StateGraph, StateSchema, StateSnapshot, ToolCall,
    ToolSource, END, START,
};

use crate::RunError;

const DEFAULT_QUESTION: &str = "What is the weather like in Mumbai?";
const RESULT_PREFIX: &str = "Tool ";

/// Calls the model with the conversation and the available tools; records
/// its reply and any tool calls it makes.
struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
}

#[async_trait]
impl Node for Agent {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let names: Vec<String> = self
            .tools
            .list_tools()
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        let mut prompt = vec![Message::system(format!(
            "Answer the user. Available tools: {}",
            names.join(", ")
        ))];
        prompt.extend(Message::list_from_values(state.get_array("messages"))?);

        let reply = self.llm.invoke(&prompt).await?;
        tracing::debug!(tool_calls = reply.tool_calls.len(), "agent replied");
        let calls = serde_json::to_value(&reply.tool_calls)
            .map_err(|e| NodeError::InvalidState(e.to_string()))?;
        let mut update = PartialUpdate::new().with("tool_calls", calls);
        if !reply.content.is_empty() {
            update = update.with("messages", json!([Message::assistant(reply.content).to_value()]));
        }
        Ok(update.into())
    }
}

/// Runs the pending tool calls in order and reports each result (or error)
/// as a message; clears `tool_calls`.
struct RunTools {
    tools: Arc<dyn ToolSource>,
}

#[async_trait]
impl Node for RunTools {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let mut results = Vec::new();
        for call in ToolCall::list_from_values(state.get_array("tool_calls"))? {
            let text = match self.tools.call_tool(&call.name, call.arguments.clone()).await {
                Ok(content) => format!("{}{} returned: {}", RESULT_PREFIX, call.name, content.text),
                Err(e) => format!("{}{} failed: {}", RESULT_PREFIX, call.name, e),
            };
            results.push(Message::user(text).to_value());
        }
        Ok(PartialUpdate::new()
            .with("messages", Value::Array(results))
            .with("tool_calls", json!([]))
            .into())
    }
}

/// `"tools"` while the last agent turn asked for tools, END otherwise.
fn tools_condition(state: &StateSnapshot) -> &'static str {
    if state.get_array("tool_calls").is_empty() {
        END
    } else {
        "tools"
    }
}

/// Mock model: asks `search` about the user's question, then answers from the result.
fn reply(messages: &[Message]) -> LlmResponse {
    let last = messages.last().map(Message::content).unwrap_or_default();
    match last.strip_prefix(RESULT_PREFIX).and_then(|r| r.split_once(" returned: ")) {
        Some((_, result)) => LlmResponse::text(format!("According to search: {}", result)),
        None => LlmResponse::with_tool_calls(
            "Let me look that up.",
            vec![ToolCall::new("search", json!({ "query": last })).with_id("call-1")],
        ),
    }
}

/// Canned search: "<place> is Cold, with a low of 13 ℃" for "... in <place>".
fn search(args: &Value) -> String {
    let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
    let place = query
        .rsplit_once(" in ")
        .map(|(_, p)| p.trim_end_matches(['?', '.', '!']).trim())
        .filter(|p| !p.is_empty())
        .unwrap_or("It");
    format!("{} is Cold, with a low of 13 ℃", place)
}

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let schema = StateSchema::builder()
        .field_with_default("messages", Reducer::Append, json!([]))
        .field_with_default("tool_calls", Reducer::LastWins, json!([]))
        .build()?;
    let tools: Arc<dyn ToolSource> =
        Arc::new(MockToolSource::new().with_handler("search", |args| Ok(search(args))));

    let mut graph = StateGraph::new(schema);
    graph
        .add_node(
            "agent",
            Arc::new(Agent {
                llm: Arc::new(MockLlm::from_response_fn(reply)),
                tools: tools.clone(),
            }),
        )
        .add_node("tools", Arc::new(RunTools { tools }))
        .add_edge(START, "agent")
        .add_conditional_edges("agent", tools_condition, ["tools", END])
        .add_edge("tools", "agent");
    Ok(graph)
}

pub(super) fn input(question: Option<&str>) -> PartialUpdate {
    let question = question.unwrap_or(DEFAULT_QUESTION);
    PartialUpdate::new().with("messages", json!([Message::user(question).to_value()]))
}
