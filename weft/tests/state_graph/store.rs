//! Cross-thread memory through the shared store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use weft::{
    namespace, CompiledStateGraph, GraphError, InMemoryStore, LlmClient, MemorySaver, Message,
    MockLlm, Node, NodeContext, NodeError, NodeOutput, PartialUpdate, Reducer, RunnableConfig,
    StateGraph, StateSchema, StateSnapshot, Store, START,
};

/// Remembers facts the user asks it to keep, per user, and answers with what it knows.
struct CallModel {
    llm: Arc<dyn LlmClient>,
}

#[async_trait]
impl Node for CallModel {
    async fn run(&self, state: &StateSnapshot, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        let store = ctx.require_store()?;
        let ns = namespace(["memories", ctx.user_id().unwrap_or("anonymous")]);
        let messages = Message::list_from_values(state.get_array("messages"))?;

        if let Some(last) = messages.iter().rev().find(|m| matches!(m, Message::User(_))) {
            if let Some(fact) = last.content().strip_prefix("remember: ") {
                let key = format!("{}-{}", ctx.thread_id().unwrap_or("none"), ctx.step());
                store.put(&ns, &key, &json!({ "data": fact })).await?;
            }
        }

        let known: Vec<String> = store
            .search(&ns)
            .await?
            .into_iter()
            .filter_map(|item| item.value["data"].as_str().map(str::to_string))
            .collect();
        let mut prompt = vec![Message::system(format!("Known facts: {}", known.join("; ")))];
        prompt.extend(messages);
        let reply = self.llm.invoke(&prompt).await?;
        Ok(PartialUpdate::new()
            .with("messages", json!([Message::assistant(reply.content).to_value()]))
            .into())
    }
}

fn memory_graph(store: Arc<dyn Store>) -> CompiledStateGraph {
    let schema = StateSchema::builder()
        .field_with_default("messages", Reducer::Append, json!([]))
        .build()
        .unwrap();
    // Replies with the system prompt so tests can see what the node knew.
    let llm = Arc::new(MockLlm::from_fn(|m| m[0].content().to_string()));
    let mut graph = StateGraph::new(schema).with_store(store);
    graph
        .add_node("call_model", Arc::new(CallModel { llm }))
        .add_edge(START, "call_model");
    graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap()
}

fn say(text: &str) -> PartialUpdate {
    PartialUpdate::new().with("messages", json!([Message::user(text).to_value()]))
}

fn config(thread: &str, user: &str) -> Option<RunnableConfig> {
    Some(RunnableConfig::for_thread(thread).with_user_id(user))
}

fn last_reply(state: &StateSnapshot) -> String {
    Message::list_from_values(state.get_array("messages"))
        .unwrap()
        .last()
        .map(|m| m.content().to_string())
        .unwrap_or_default()
}

/// **Scenario**: A fact stored on one thread is visible on another thread of the same user only.
#[tokio::test]
async fn memory_crosses_threads_not_users() {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let graph = memory_graph(store.clone());

    graph
        .invoke(say("remember: my name is Bob"), config("1", "u1"))
        .await
        .unwrap();

    let out = graph
        .invoke(say("what is my name?"), config("2", "u1"))
        .await
        .unwrap();
    assert!(last_reply(&out.state).contains("my name is Bob"));
    assert_eq!(out.state.get_array("messages").len(), 2);

    let other = graph
        .invoke(say("what is my name?"), config("3", "u2"))
        .await
        .unwrap();
    assert!(!last_reply(&other.state).contains("Bob"));

    let items = store.search(&namespace(["memories"])).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].namespace, namespace(["memories", "u1"]));
}

/// **Scenario**: A node requiring the store fails cleanly when the graph has none.
#[tokio::test]
async fn missing_store_fails_node() {
    let schema = StateSchema::builder()
        .field_with_default("messages", Reducer::Append, json!([]))
        .build()
        .unwrap();
    let mut graph = StateGraph::new(schema);
    graph
        .add_node(
            "call_model",
            Arc::new(CallModel {
                llm: Arc::new(MockLlm::echo()),
            }),
        )
        .add_edge(START, "call_model");
    match graph.compile().unwrap().invoke(say("hi"), None).await {
        Err(GraphError::NodeFailed { node, .. }) => assert_eq!(node, "call_model"),
        other => panic!("expected NodeFailed, got {:?}", other),
    }
}
