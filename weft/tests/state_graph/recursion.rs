//! Recursion limit: bounded steps per invocation and continuing afterwards.

use std::sync::Arc;

use weft::{
    GraphError, GraphInput, MemorySaver, PartialUpdate, RunnableConfig, StateGraph, END, START,
};

use crate::common::{aggregate, aggregate_schema, say};

/// a -> b -> c -> d.
fn chain() -> StateGraph {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("b", say("B"))
        .add_node("c", say("C"))
        .add_node("d", say("D"))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", "c")
        .add_edge("c", "d")
        .add_edge("d", END);
    graph
}

fn limited(thread: Option<&str>, limit: usize) -> Option<RunnableConfig> {
    let config = match thread {
        Some(t) => RunnableConfig::for_thread(t),
        None => RunnableConfig::default(),
    };
    Some(config.with_recursion_limit(limit))
}

/// **Scenario**: A four-step chain with limit 3 fails after three steps and carries their state.
#[tokio::test]
async fn limit_reached_carries_partial_state() {
    let graph = chain().compile().unwrap();
    match graph.invoke(PartialUpdate::new(), limited(None, 3)).await {
        Err(e @ GraphError::RecursionLimitExceeded { .. }) => {
            let state = e.partial_state().unwrap();
            assert_eq!(aggregate(state), vec!["I'm A", "I'm B", "I'm C"]);
            assert!(matches!(e, GraphError::RecursionLimitExceeded { limit: 3, .. }));
        }
        other => panic!("expected RecursionLimitExceeded, got {:?}", other),
    }
}

/// **Scenario**: A limit equal to the number of steps is enough.
#[tokio::test]
async fn limit_equal_to_steps_succeeds() {
    let graph = chain().compile().unwrap();
    let out = graph
        .invoke(PartialUpdate::new(), limited(None, 4))
        .await
        .unwrap();
    assert_eq!(aggregate(&out.state).len(), 4);
}

/// **Scenario**: A node looping to itself stops at the default limit of 25.
#[tokio::test]
async fn self_loop_hits_default_limit() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("spin", say("spin"))
        .add_edge(START, "spin")
        .add_edge("spin", "spin");
    match graph.compile().unwrap().invoke(PartialUpdate::new(), None).await {
        Err(GraphError::RecursionLimitExceeded { limit, state }) => {
            assert_eq!(limit, weft::DEFAULT_RECURSION_LIMIT);
            assert_eq!(aggregate(&state).len(), 25);
        }
        other => panic!("expected RecursionLimitExceeded, got {:?}", other),
    }
}

/// **Scenario**: After hitting the limit on a thread, Continue with a fresh budget finishes the run.
#[tokio::test]
async fn continue_after_limit() {
    let graph = chain()
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();
    let err = graph
        .invoke(PartialUpdate::new(), limited(Some("r"), 2))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::RecursionLimitExceeded { .. }));

    let latest = graph.get_state("r").await.unwrap().unwrap();
    assert_eq!(latest.next, vec!["c".to_string()]);

    let out = graph
        .invoke(GraphInput::Continue, limited(Some("r"), 10))
        .await
        .unwrap();
    assert_eq!(aggregate(&out.state), vec!["I'm A", "I'm B", "I'm C", "I'm D"]);
}

/// **Scenario**: Continue on a thread with no checkpoints fails with NothingToContinue.
#[tokio::test]
async fn continue_on_empty_thread() {
    let graph = chain()
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();
    assert!(matches!(
        graph.invoke(GraphInput::Continue, limited(Some("none"), 5)).await,
        Err(GraphError::NothingToContinue(_))
    ));
}
