//! Fan-out and fan-in: parallel branches within one step.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Barrier;
use weft::{
    node_fn, sync_node, MemorySaver, PartialUpdate, Reducer, StateGraph, StateSchema, START,
};

use crate::common::{aggregate, aggregate_schema, diamond, say, thread};

/// **Scenario**: a→b, a→c, b→d, c→d yields A, then B and C in registration order, then D once.
#[tokio::test]
async fn diamond_aggregates_every_branch() {
    let graph = diamond().compile().unwrap();
    let out = graph
        .invoke(PartialUpdate::new().with("aggregate", json!([])), None)
        .await
        .unwrap();
    assert_eq!(aggregate(&out.state), vec!["I'm A", "I'm B", "I'm C", "I'm D"]);
    assert!(!out.is_interrupted());
}

/// **Scenario**: Merge order follows node registration, not edge declaration.
#[tokio::test]
async fn merge_order_is_registration_order() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("b", say("B"))
        .add_node("c", say("C"))
        .add_edge(START, "a")
        .add_edge("a", "c")
        .add_edge("a", "b");
    let out = graph
        .compile()
        .unwrap()
        .invoke(PartialUpdate::new(), None)
        .await
        .unwrap();
    assert_eq!(aggregate(&out.state), vec!["I'm A", "I'm B", "I'm C"]);
}

/// **Scenario**: Siblings in one step read the same snapshot and do not see each other's writes.
#[tokio::test]
async fn siblings_read_step_start_snapshot() {
    let schema = StateSchema::builder()
        .field_with_default("aggregate", Reducer::Append, json!([]))
        .field_with_default("seen", Reducer::Append, json!([]))
        .build()
        .unwrap();
    let observe = || {
        sync_node(|state, ctx| {
            let seen = state.get_array("aggregate").len();
            Ok(PartialUpdate::new()
                .with("aggregate", json!([ctx.node()]))
                .with("seen", json!([seen]))
                .into())
        })
    };
    let mut graph = StateGraph::new(schema);
    graph
        .add_node("a", say("A"))
        .add_node("b", observe())
        .add_node("c", observe())
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("a", "c");
    let out = graph
        .compile()
        .unwrap()
        .invoke(PartialUpdate::new(), None)
        .await
        .unwrap();
    assert_eq!(out.state.get("seen"), Some(&json!([1, 1])));
    assert_eq!(aggregate(&out.state), vec!["I'm A", "b", "c"]);
}

/// **Scenario**: Nodes of one step run concurrently; two nodes waiting on a shared barrier both finish.
#[tokio::test]
async fn siblings_run_concurrently() {
    let barrier = Arc::new(Barrier::new(2));
    let rendezvous = |tag: &'static str| {
        let barrier = barrier.clone();
        node_fn(move |_, _| {
            let barrier = barrier.clone();
            async move {
                barrier.wait().await;
                Ok(PartialUpdate::new()
                    .with("aggregate", json!([tag]))
                    .into())
            }
        })
    };
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("left", rendezvous("L"))
        .add_node("right", rendezvous("R"))
        .add_edge(START, "left")
        .add_edge(START, "right");
    let compiled = graph.compile().unwrap();
    let out = tokio::time::timeout(
        Duration::from_secs(5),
        compiled.invoke(PartialUpdate::new(), None),
    )
    .await
    .expect("siblings deadlocked")
    .unwrap();
    assert_eq!(aggregate(&out.state), vec!["L", "R"]);
}

/// **Scenario**: A join node reached from two branches in the same step runs once.
#[tokio::test]
async fn join_node_runs_once_per_step() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let mut graph = diamond();
    graph.add_node(
        "e",
        sync_node(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(PartialUpdate::new().into())
        }),
    );
    graph.add_edge("b", "e").add_edge("c", "e");
    graph.compile().unwrap().invoke(PartialUpdate::new(), None).await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

/// **Scenario**: With a thread, the diamond commits input plus three steps.
#[tokio::test]
async fn diamond_checkpoints_each_step() {
    let graph = diamond()
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();
    graph.invoke(PartialUpdate::new(), thread("t")).await.unwrap();
    let history = graph.get_state_history("t", None).await.unwrap();
    let nexts: Vec<Vec<String>> = history.iter().map(|c| c.next.clone()).collect();
    assert_eq!(
        nexts,
        vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "c".to_string()],
            vec!["d".to_string()],
            vec![],
        ]
    );
}
