//! Conditional edges: routing on committed state, multi-target routes, cycles.

use std::sync::Arc;

use serde_json::json;
use weft::{
    sync_node, GraphError, MemorySaver, PartialUpdate, Reducer, Route, StateGraph, StateSchema,
    END, START,
};

use crate::common::{aggregate, aggregate_schema, say, thread};

/// a routes on `which`: "cd" goes to c and d, anything else to b and c; all join at e.
fn branching() -> StateGraph {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("b", say("B"))
        .add_node("c", say("C"))
        .add_node("d", say("D"))
        .add_node("e", say("E"))
        .add_edge(START, "a")
        .add_conditional_edges(
            "a",
            |s| {
                if s.get_str("which") == Some("cd") {
                    vec!["c", "d"]
                } else {
                    vec!["b", "c"]
                }
            },
            ["b", "c", "d"],
        )
        .add_edge("b", "e")
        .add_edge("c", "e")
        .add_edge("d", "e")
        .add_edge("e", END);
    graph
}

/// **Scenario**: which = "cd" visits A, C, D, E and skips B.
#[tokio::test]
async fn route_cd_skips_b() {
    let graph = branching().compile().unwrap();
    let out = graph
        .invoke(
            PartialUpdate::new()
                .with("aggregate", json!([]))
                .with("which", "cd"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(aggregate(&out.state), vec!["I'm A", "I'm C", "I'm D", "I'm E"]);
}

/// **Scenario**: which = "bc" visits A, B, C, E.
#[tokio::test]
async fn route_bc_skips_d() {
    let graph = branching().compile().unwrap();
    let out = graph
        .invoke(PartialUpdate::new().with("which", "bc"), None)
        .await
        .unwrap();
    assert_eq!(aggregate(&out.state), vec!["I'm A", "I'm B", "I'm C", "I'm E"]);
}

/// **Scenario**: The router sees the state after its source's step is merged.
#[tokio::test]
async fn router_reads_committed_update() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node(
            "pick",
            sync_node(|_, _| Ok(PartialUpdate::new().with("which", "cd").into())),
        )
        .add_node("c", say("C"))
        .add_node("other", say("other"))
        .add_edge(START, "pick")
        .add_conditional_edges(
            "pick",
            |s| if s.get_str("which") == Some("cd") { "c" } else { "other" },
            ["c", "other"],
        );
    let out = graph
        .compile()
        .unwrap()
        .invoke(PartialUpdate::new(), None)
        .await
        .unwrap();
    assert_eq!(aggregate(&out.state), vec!["I'm C"]);
}

/// **Scenario**: A router returning an undeclared name fails with InvalidRoute and commits nothing.
#[tokio::test]
async fn undeclared_route_is_rejected() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("b", say("B"))
        .add_edge(START, "a")
        .add_conditional_edges("a", |_| Route::from("z"), ["b", END]);
    let compiled = graph
        .compile_with_checkpointer(Arc::new(MemorySaver::new()))
        .unwrap();

    match compiled.invoke(PartialUpdate::new(), thread("t")).await {
        Err(GraphError::InvalidRoute { from, to }) => {
            assert_eq!(from, "a");
            assert_eq!(to, "z");
        }
        other => panic!("expected InvalidRoute, got {:?}", other),
    }

    let latest = compiled.get_state("t").await.unwrap().unwrap();
    assert_eq!(latest.step, 0);
    assert!(aggregate(&latest.state).is_empty());
}

/// **Scenario**: A cycle through a router loops until the router returns END.
#[tokio::test]
async fn cycle_until_router_ends() {
    let schema = StateSchema::builder()
        .field_with_default("count", Reducer::LastWins, json!(0))
        .build()
        .unwrap();
    let mut graph = StateGraph::new(schema);
    graph
        .add_node(
            "inc",
            sync_node(|s, _| {
                let n = s.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
                Ok(PartialUpdate::new().with("count", n + 1).into())
            }),
        )
        .add_edge(START, "inc")
        .add_conditional_edges(
            "inc",
            |s| {
                if s.get("count").and_then(|v| v.as_i64()) < Some(3) {
                    "inc"
                } else {
                    END
                }
            },
            ["inc", END],
        );
    let out = graph
        .compile()
        .unwrap()
        .invoke(PartialUpdate::new(), None)
        .await
        .unwrap();
    assert_eq!(out.state.get("count"), Some(&json!(3)));
}
