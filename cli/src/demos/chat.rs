//! Multi-turn chat: every run on a thread appends the user's message and the
//! model's reply to `messages`, so later turns see the whole conversation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use weft::{
    LlmClient, Message, MockLlm, Node, NodeContext, NodeError, NodeOutput, PartialUpdate,
    Reducer, StateGraph, StateSchema, StateSnapshot, START,
};

use crate::RunError;

/// Sends the conversation to the model and appends its reply.
pub(super) struct CallModel {
    pub(super) llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for CallModel {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let messages = Message::list_from_values(state.get_array("messages"))?;
        let reply = self.llm.invoke(&messages).await?;
        Ok(assistant_reply(reply.content))
    }
}

pub(super) fn assistant_reply(content: String) -> NodeOutput {
    PartialUpdate::new()
        .with("messages", json!([Message::assistant(content).to_value()]))
        .into()
}

pub(super) fn messages_schema() -> Result<StateSchema, RunError> {
    Ok(StateSchema::builder()
        .field_with_default("messages", Reducer::Append, json!([]))
        .build()?)
}

/// Mock reply that shows the model saw earlier turns.
fn reply(messages: &[Message]) -> String {
    let turns = messages
        .iter()
        .filter(|m| matches!(m, Message::User(_)))
        .count();
    let last = messages.last().map(Message::content).unwrap_or_default();
    format!("(turn {}) you said: {}", turns, last)
}

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let mut graph = StateGraph::new(messages_schema()?);
    graph
        .add_node(
            "call_model",
            Arc::new(CallModel {
                llm: Arc::new(MockLlm::from_fn(reply)),
            }),
        )
        .add_edge(START, "call_model");
    Ok(graph)
}

pub(super) fn input(text: Option<&str>) -> PartialUpdate {
    let text = text.unwrap_or("hi! I'm bob");
    PartialUpdate::new().with("messages", json!([Message::user(text).to_value()]))
}
