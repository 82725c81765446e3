//! Cross-thread memory: facts the user asks to remember ("remember: ...")
//! are stored under `["memories", user_id]` and offered to the model on every
//! thread of that user.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use weft::{
    namespace, LlmClient, Message, MockLlm, Node, NodeContext, NodeError, NodeOutput, StateGraph,
    StateSnapshot, START,
};

use super::chat::{assistant_reply, messages_schema};
use crate::RunError;

const REMEMBER_PREFIX: &str = "remember:";

struct CallModelWithMemory {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for CallModelWithMemory {
    async fn run(&self, state: &StateSnapshot, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let store = ctx.require_store()?;
        let ns = namespace(["memories", ctx.user_id().unwrap_or("default")]);
        let messages = Message::list_from_values(state.get_array("messages"))?;

        let last_user = messages.iter().rev().find(|m| matches!(m, Message::User(_)));
        if let Some(fact) = last_user.and_then(|m| fact_to_remember(m.content())) {
            let key = format!("{}-{}", ctx.thread_id().unwrap_or("none"), ctx.step());
            store.put(&ns, &key, &json!({ "data": fact })).await?;
            tracing::debug!(key = %key, "stored memory");
        }

        let facts: Vec<String> = store
            .search(&ns)
            .await?
            .into_iter()
            .filter_map(|item| item.value.get("data")?.as_str().map(str::to_string))
            .collect();
        let system = if facts.is_empty() {
            "You know nothing about the user yet.".to_string()
        } else {
            format!("User info: {}", facts.join("; "))
        };

        let mut prompt = vec![Message::system(system)];
        prompt.extend(messages);
        let reply = self.llm.invoke(&prompt).await?;
        Ok(assistant_reply(reply.content))
    }
}

/// Text after a leading "remember:" (case-insensitive), trimmed.
fn fact_to_remember(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let head = trimmed.get(..REMEMBER_PREFIX.len())?;
    if !head.eq_ignore_ascii_case(REMEMBER_PREFIX) {
        return None;
    }
    let fact = trimmed[REMEMBER_PREFIX.len()..].trim();
    (!fact.is_empty()).then_some(fact)
}

/// Mock model: answers with what the system prompt says it knows.
fn reply(messages: &[Message]) -> String {
    let known = messages
        .iter()
        .find(|m| matches!(m, Message::System(_)))
        .map(Message::content)
        .unwrap_or_default();
    let last = messages.last().map(Message::content).unwrap_or_default();
    format!("[{}] you said: {}", known, last)
}

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let mut graph = StateGraph::new(messages_schema()?);
    graph
        .add_node(
            "call_model",
            Arc::new(CallModelWithMemory {
                llm: Arc::new(MockLlm::from_fn(reply)),
            }),
        )
        .add_edge(START, "call_model");
    Ok(graph)
}
