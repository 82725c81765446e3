//! Node failures and schema violations: nothing from the failing step is committed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use weft::{
    sync_node, GraphError, GraphInput, MemorySaver, NodeError, PartialUpdate, StateGraph, END,
    START,
};

use crate::common::{aggregate, aggregate_schema, say, thread};

/// **Scenario**: A failing node aborts the run; the thread keeps the last good commit and Continue retries it.
#[tokio::test]
async fn failed_step_can_be_continued() {
    let broken = Arc::new(AtomicBool::new(true));
    let flag = broken.clone();
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node(
            "flaky",
            sync_node(move |_, _| {
                if flag.load(Ordering::SeqCst) {
                    Err(NodeError::ExecutionFailed("upstream timeout".into()))
                } else {
                    Ok(PartialUpdate::new()
                        .with("aggregate", json!(["I'm flaky"]))
                        .into())
                }
            }),
        )
        .add_node("sibling", say("sibling"))
        .add_edge(START, "a")
        .add_edge("a", "flaky")
        .add_edge("a", "sibling")
        .add_edge("flaky", END);
    let graph = graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();

    match graph.invoke(PartialUpdate::new(), thread("f")).await {
        Err(GraphError::NodeFailed { node, source }) => {
            assert_eq!(node, "flaky");
            assert!(source.to_string().contains("upstream timeout"));
        }
        other => panic!("expected NodeFailed, got {:?}", other),
    }
    let latest = graph.get_state("f").await.unwrap().unwrap();
    assert_eq!(aggregate(&latest.state), vec!["I'm A"]);
    assert_eq!(latest.next, vec!["flaky".to_string(), "sibling".to_string()]);

    broken.store(false, Ordering::SeqCst);
    let out = graph.invoke(GraphInput::Continue, thread("f")).await.unwrap();
    assert_eq!(aggregate(&out.state), vec!["I'm A", "I'm flaky", "I'm sibling"]);
}

/// **Scenario**: An update naming an undeclared field fails the step and no sibling write lands.
#[tokio::test]
async fn unknown_field_rejects_whole_step() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("good", say("good"))
        .add_node(
            "bad",
            sync_node(|_, _| Ok(PartialUpdate::new().with("nope", 1).into())),
        )
        .add_edge(START, "good")
        .add_edge(START, "bad");
    let graph = graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();

    match graph.invoke(PartialUpdate::new(), thread("v")).await {
        Err(GraphError::SchemaViolation(v)) => assert_eq!(v.field, "nope"),
        other => panic!("expected SchemaViolation, got {:?}", other),
    }
    let history = graph.get_state_history("v", None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(aggregate(&history[0].state).is_empty());
}

/// **Scenario**: Input naming an undeclared field is rejected before anything runs.
#[tokio::test]
async fn unknown_input_field_rejected() {
    let graph = crate::common::diamond().compile().unwrap();
    assert!(matches!(
        graph
            .invoke(PartialUpdate::new().with("bogus", true), None)
            .await,
        Err(GraphError::SchemaViolation(_))
    ));
}
