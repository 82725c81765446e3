//! Human-in-the-loop: suspend a node, inspect the checkpoint, resume with a value.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use weft::{
    sync_node, Command, CompiledStateGraph, GraphError, GraphInput, MemorySaver, PartialUpdate,
    Reducer, StateGraph, StateSchema, END, START,
};

use crate::common::thread;

fn review_schema() -> StateSchema {
    StateSchema::builder()
        .field("text", Reducer::LastWins)
        .field_with_default("log", Reducer::Append, json!([]))
        .build()
        .unwrap()
}

/// generate writes "original"; human asks for a revision and writes the answer.
fn review_graph() -> CompiledStateGraph {
    let mut graph = StateGraph::new(review_schema());
    graph
        .add_node(
            "generate",
            sync_node(|_, _| Ok(PartialUpdate::new().with("text", "original").into())),
        )
        .add_node(
            "human",
            sync_node(|state, ctx| {
                let current = state.get_str("text").unwrap_or_default();
                match ctx.interrupt(json!({ "text_to_revise": current })) {
                    Ok(answer) => Ok(PartialUpdate::new().with("text", answer).into()),
                    Err(suspend) => Ok(suspend),
                }
            }),
        )
        .add_edge(START, "generate")
        .add_edge("generate", "human")
        .add_edge("human", END);
    graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap()
}

/// **Scenario**: The run suspends at human with the payload; resuming with "edited" finishes with text "edited".
#[tokio::test]
async fn suspend_then_resume_with_edit() {
    let graph = review_graph();

    let out = graph.invoke(PartialUpdate::new(), thread("1")).await.unwrap();
    assert!(out.is_interrupted());
    assert_eq!(out.interrupts.len(), 1);
    assert_eq!(out.interrupts[0].node, "human");
    assert_eq!(out.interrupts[0].value, json!({ "text_to_revise": "original" }));
    assert_eq!(out.state.get_str("text"), Some("original"));

    let pending = graph.get_state("1").await.unwrap().unwrap();
    assert!(pending.is_interrupted());
    assert_eq!(pending.next, vec!["human".to_string()]);

    let out = graph
        .invoke(Command::resume("edited"), thread("1"))
        .await
        .unwrap();
    assert!(!out.is_interrupted());
    assert_eq!(out.state.get_str("text"), Some("edited"));

    let done = graph.get_state("1").await.unwrap().unwrap();
    assert!(done.is_done());
    assert!(!done.is_interrupted());
}

/// **Scenario**: A second resume after the run completed fails with NoPendingInterrupt.
#[tokio::test]
async fn second_resume_is_rejected() {
    let graph = review_graph();
    graph.invoke(PartialUpdate::new(), thread("1")).await.unwrap();
    graph
        .invoke(Command::resume("edited"), thread("1"))
        .await
        .unwrap();

    match graph.invoke(Command::resume("again"), thread("1")).await {
        Err(GraphError::NoPendingInterrupt(t)) => assert_eq!(t, "1"),
        other => panic!("expected NoPendingInterrupt, got {:?}", other),
    }
}

/// **Scenario**: Resuming a thread that never ran fails with NoPendingInterrupt.
#[tokio::test]
async fn resume_unknown_thread() {
    let graph = review_graph();
    assert!(matches!(
        graph.invoke(Command::resume("x"), thread("nobody")).await,
        Err(GraphError::NoPendingInterrupt(_))
    ));
}

/// **Scenario**: Resume without a thread id has nothing to load and needs persistence.
#[tokio::test]
async fn resume_without_thread() {
    let graph = review_graph();
    assert!(matches!(
        graph.invoke(Command::resume("x"), None).await,
        Err(GraphError::CheckpointerRequired(_))
    ));
}

/// **Scenario**: Without a checkpointer the run still stops and reports the interrupt.
#[tokio::test]
async fn suspend_without_checkpointer() {
    let mut graph = StateGraph::new(review_schema());
    graph
        .add_node(
            "human",
            sync_node(|_, ctx| match ctx.interrupt(json!("approve?")) {
                Ok(_) => Ok(PartialUpdate::new().into()),
                Err(suspend) => Ok(suspend),
            }),
        )
        .add_edge(START, "human");
    let out = graph
        .compile()
        .unwrap()
        .invoke(PartialUpdate::new(), thread("1"))
        .await
        .unwrap();
    assert_eq!(out.interrupts.len(), 1);
    assert_eq!(out.interrupts[0].value, json!("approve?"));
}

/// **Scenario**: A sibling that finished in the suspended step is not re-run on resume and its write survives.
#[tokio::test]
async fn sibling_write_carried_across_resume() {
    let worker_runs = Arc::new(AtomicUsize::new(0));
    let counter = worker_runs.clone();
    let mut graph = StateGraph::new(review_schema());
    graph
        .add_node(
            "human",
            sync_node(|_, ctx| match ctx.interrupt(json!("approve?")) {
                Ok(answer) => Ok(PartialUpdate::new().with("log", json!([answer])).into()),
                Err(suspend) => Ok(suspend),
            }),
        )
        .add_node(
            "worker",
            sync_node(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(PartialUpdate::new().with("log", json!(["worked"])).into())
            }),
        )
        .add_edge(START, "human")
        .add_edge(START, "worker");
    let graph = graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();

    let out = graph.invoke(PartialUpdate::new(), thread("s")).await.unwrap();
    assert!(out.is_interrupted());
    assert_eq!(out.state.get("log"), Some(&json!([])));
    let pending = graph.get_state("s").await.unwrap().unwrap();
    assert_eq!(pending.pending_writes.len(), 1);
    assert_eq!(pending.pending_writes[0].node, "worker");

    let out = graph
        .invoke(Command::resume("yes"), thread("s"))
        .await
        .unwrap();
    assert_eq!(out.state.get("log"), Some(&json!(["yes", "worked"])));
    assert_eq!(worker_runs.load(Ordering::SeqCst), 1);
}

/// **Scenario**: New input on a suspended thread starts over from START and suspends again.
#[tokio::test]
async fn values_input_supersedes_pending_interrupt() {
    let graph = review_graph();
    let first = graph.invoke(PartialUpdate::new(), thread("1")).await.unwrap();
    let second = graph
        .invoke(GraphInput::from(PartialUpdate::new()), thread("1"))
        .await
        .unwrap();
    assert!(second.is_interrupted());
    assert_ne!(first.interrupts[0].id, second.interrupts[0].id);

    let out = graph
        .invoke(Command::resume("final"), thread("1"))
        .await
        .unwrap();
    assert_eq!(out.state.get_str("text"), Some("final"));
}

/// **Scenario**: A sibling writing an unknown field in a suspending step fails the step; no interrupted checkpoint is saved.
#[tokio::test]
async fn invalid_sibling_write_fails_suspending_step() {
    let mut graph = StateGraph::new(review_schema());
    graph
        .add_node(
            "writer",
            sync_node(|_, _| Ok(PartialUpdate::new().with("bogus", 1).into())),
        )
        .add_node(
            "human",
            sync_node(|_, ctx| match ctx.interrupt(json!("approve?")) {
                Ok(answer) => Ok(PartialUpdate::new().with("text", answer).into()),
                Err(suspend) => Ok(suspend),
            }),
        )
        .add_edge(START, "writer")
        .add_edge(START, "human");
    let graph = graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();

    let err = graph
        .invoke(PartialUpdate::new(), thread("v"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::SchemaViolation(ref v) if v.field == "bogus"));

    let latest = graph.get_state("v").await.unwrap().unwrap();
    assert_eq!(latest.step, 0);
    assert!(!latest.is_interrupted());
    assert!(latest.pending_writes.is_empty());
    assert_eq!(graph.get_state_history("v", None).await.unwrap().len(), 1);

    let err = graph
        .invoke(Command::resume("yes"), thread("v"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::NoPendingInterrupt(_)));
}
