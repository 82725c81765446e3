//! Threads: checkpoint ordering, multi-turn conversations, isolation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use weft::{
    CompiledStateGraph, LlmClient, MemorySaver, Message, MockLlm, Node, NodeContext, NodeError,
    NodeOutput, PartialUpdate, Reducer, StateGraph, StateSchema, StateSnapshot, START,
};

use crate::common::{aggregate, diamond, thread};

/// Appends the model's reply to `messages`.
struct ChatNode {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for ChatNode {
    async fn run(&self, state: &StateSnapshot, _ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let messages = Message::list_from_values(state.get_array("messages"))?;
        let reply = self.llm.invoke(&messages).await?;
        Ok(PartialUpdate::new()
            .with("messages", json!([Message::assistant(reply.content).to_value()]))
            .into())
    }
}

fn chat_graph(llm: Arc<dyn LlmClient>) -> CompiledStateGraph {
    let schema = StateSchema::builder()
        .field_with_default("messages", Reducer::Append, json!([]))
        .build()
        .unwrap();
    let mut graph = StateGraph::new(schema);
    graph
        .add_node("chat", Arc::new(ChatNode { llm }))
        .add_edge(START, "chat");
    graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap()
}

fn user(text: &str) -> PartialUpdate {
    PartialUpdate::new().with("messages", json!([Message::user(text).to_value()]))
}

/// **Scenario**: Checkpoint steps of a thread strictly increase across invocations.
#[tokio::test]
async fn checkpoint_steps_strictly_increase() {
    let graph = diamond()
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();
    graph.invoke(PartialUpdate::new(), thread("t")).await.unwrap();
    let out = graph.invoke(PartialUpdate::new(), thread("t")).await.unwrap();

    let steps: Vec<i64> = graph
        .get_state_history("t", None)
        .await
        .unwrap()
        .iter()
        .map(|c| c.step)
        .collect();
    assert_eq!(steps, (0..8).collect::<Vec<i64>>());
    // The second run starts from the first run's final state.
    assert_eq!(aggregate(&out.state).len(), 8);
}

/// **Scenario**: Each turn on a thread sees the whole conversation so far.
#[tokio::test]
async fn multi_turn_conversation_accumulates() {
    let llm = Arc::new(MockLlm::from_fn(|messages| {
        format!("turn {}", messages.iter().filter(|m| matches!(m, Message::User(_))).count())
    }));
    let graph = chat_graph(llm.clone());

    graph.invoke(user("hi! I'm bob"), thread("1")).await.unwrap();
    let out = graph.invoke(user("what's my name?"), thread("1")).await.unwrap();

    let messages = Message::list_from_values(out.state.get_array("messages")).unwrap();
    assert_eq!(
        messages,
        vec![
            Message::user("hi! I'm bob"),
            Message::assistant("turn 1"),
            Message::user("what's my name?"),
            Message::assistant("turn 2"),
        ]
    );
    assert_eq!(llm.calls(), 2);
}

/// **Scenario**: Two threads on the same graph do not share state.
#[tokio::test]
async fn threads_are_isolated() {
    let graph = chat_graph(Arc::new(MockLlm::echo()));
    graph.invoke(user("one"), thread("a")).await.unwrap();
    graph.invoke(user("two"), thread("a")).await.unwrap();
    let out = graph.invoke(user("three"), thread("b")).await.unwrap();

    assert_eq!(out.state.get_array("messages").len(), 2);
    let a = graph.get_state("a").await.unwrap().unwrap();
    assert_eq!(a.state.get_array("messages").len(), 4);
}

/// **Scenario**: History keeps the most recent checkpoints when limited, oldest first.
#[tokio::test]
async fn history_limit_keeps_most_recent() {
    let graph = chat_graph(Arc::new(MockLlm::echo()));
    graph.invoke(user("one"), thread("h")).await.unwrap();
    graph.invoke(user("two"), thread("h")).await.unwrap();

    let recent = graph.get_state_history("h", Some(2)).await.unwrap();
    let steps: Vec<i64> = recent.iter().map(|c| c.step).collect();
    assert_eq!(steps, vec![2, 3]);
}
