//! Streaming: values, updates and checkpoint events; interrupt and error endings.

use std::sync::Arc;

use serde_json::json;
use tokio_stream::StreamExt;
use weft::{
    sync_node, GraphError, MemorySaver, NodeError, PartialUpdate, StateGraph, StreamEvent,
    StreamMode, START,
};

use crate::common::{aggregate, aggregate_schema, diamond, say, thread};

/// **Scenario**: Values mode emits the input state and the state after every step.
#[tokio::test]
async fn values_after_input_and_each_step() {
    let graph = diamond().compile().unwrap();
    let events: Vec<_> = graph
        .stream(PartialUpdate::new(), None, [StreamMode::Values])
        .collect()
        .await;

    let states: Vec<Vec<String>> = events
        .into_iter()
        .map(|e| match e {
            Ok(StreamEvent::Values(s)) => aggregate(&s),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(
        states,
        vec![
            vec![],
            vec!["I'm A"],
            vec!["I'm A", "I'm B", "I'm C"],
            vec!["I'm A", "I'm B", "I'm C", "I'm D"],
        ]
    );
}

/// **Scenario**: Updates mode emits each node's partial update in merge order.
#[tokio::test]
async fn updates_in_merge_order() {
    let graph = diamond().compile().unwrap();
    let events: Vec<_> = graph
        .stream(PartialUpdate::new(), None, [StreamMode::Updates])
        .collect()
        .await;

    let nodes: Vec<String> = events
        .iter()
        .map(|e| match e {
            Ok(StreamEvent::Updates { node, update }) => {
                assert!(update.get("aggregate").is_some());
                node.clone()
            }
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(nodes, vec!["a", "b", "c", "d"]);
}

/// **Scenario**: Checkpoints mode reports every saved checkpoint with increasing steps.
#[tokio::test]
async fn checkpoint_events_follow_saves() {
    let graph = diamond()
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();
    let events: Vec<_> = graph
        .stream(PartialUpdate::new(), thread("s"), [StreamMode::Checkpoints])
        .collect()
        .await;

    let steps: Vec<i64> = events
        .iter()
        .map(|e| match e {
            Ok(StreamEvent::Checkpoint(cp)) => {
                assert_eq!(cp.thread_id, "s");
                cp.step
            }
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(steps, vec![0, 1, 2, 3]);
}

/// **Scenario**: A suspended run's stream ends with the interrupt even when only values were requested.
#[tokio::test]
async fn interrupt_is_terminal_event() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node(
            "ask",
            sync_node(|_, ctx| match ctx.interrupt(json!({ "question": "ok?" })) {
                Ok(_) => Ok(PartialUpdate::new().into()),
                Err(suspend) => Ok(suspend),
            }),
        )
        .add_edge(START, "a")
        .add_edge("a", "ask");
    let graph = graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();
    let events: Vec<_> = graph
        .stream(PartialUpdate::new(), thread("i"), [StreamMode::Values])
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    match events.last() {
        Some(Ok(StreamEvent::Interrupt(interrupts))) => {
            assert_eq!(interrupts[0].node, "ask");
            assert_eq!(interrupts[0].value, json!({ "question": "ok?" }));
        }
        other => panic!("expected interrupt, got {:?}", other),
    }
}

/// **Scenario**: A failing run's stream ends with the error.
#[tokio::test]
async fn error_is_terminal_item() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node(
            "boom",
            sync_node(|_, _| Err(NodeError::ExecutionFailed("boom".into()))),
        )
        .add_edge(START, "boom");
    let events: Vec<_> = graph
        .compile()
        .unwrap()
        .stream(PartialUpdate::new(), None, [StreamMode::Values, StreamMode::Updates])
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Ok(StreamEvent::Values(_))));
    assert!(matches!(
        events[1],
        Err(GraphError::NodeFailed { ref node, .. }) if node == "boom"
    ));
}
