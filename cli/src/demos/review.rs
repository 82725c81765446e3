//! Human review: a model drafts text, then the run suspends so a person can
//! replace it. Resume with the revised text (or `{"text": ...}`).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use weft::{
    sync_node, LlmClient, Message, MockLlm, Node, NodeContext, NodeError, NodeOutput,
    PartialUpdate, Reducer, StateGraph, StateSchema, StateSnapshot, END, START,
};

use crate::RunError;

const DEFAULT_TOPIC: &str = "a haiku about borrowed references";

/// Writes the model's draft for `topic` into `text`.
struct Draft {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for Draft {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let topic = state.get_str("topic").unwrap_or(DEFAULT_TOPIC);
        let prompt = [
            Message::system("Write a short first draft."),
            Message::user(topic),
        ];
        let reply = self.llm.invoke(&prompt).await?;
        Ok(PartialUpdate::new().with("text", reply.content).into())
    }
}

/// Accepts a bare string or an object carrying `text`.
fn revised_text(answer: Value) -> Value {
    match answer {
        Value::Object(mut map) => map.remove("text").unwrap_or(Value::Null),
        other => other,
    }
}

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let schema = StateSchema::builder()
        .field("topic", Reducer::LastWins)
        .field("text", Reducer::LastWins)
        .build()?;
    let llm = Arc::new(MockLlm::from_fn(|messages| {
        let topic = messages.last().map(Message::content).unwrap_or_default();
        format!("Draft on {}: original", topic)
    }));
    let mut graph = StateGraph::new(schema);
    graph
        .add_node("generate", Arc::new(Draft { llm }))
        .add_node(
            "human",
            sync_node(|state, ctx| {
                let current = state.get_str("text").unwrap_or_default();
                match ctx.interrupt(json!({ "text_to_revise": current })) {
                    Ok(answer) => Ok(PartialUpdate::new()
                        .with("text", revised_text(answer))
                        .into()),
                    Err(suspend) => Ok(suspend),
                }
            }),
        )
        .add_edge(START, "generate")
        .add_edge("generate", "human")
        .add_edge("human", END);
    Ok(graph)
}

pub(super) fn input(topic: Option<&str>) -> PartialUpdate {
    PartialUpdate::new().with("topic", topic.unwrap_or(DEFAULT_TOPIC))
}
