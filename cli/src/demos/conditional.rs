//! Conditional branching: after a, route to {c, d} when `which` is "cd",
//! otherwise to {b, c}; every branch joins at e.

use serde_json::json;
use weft::{PartialUpdate, Reducer, StateGraph, StateSchema, END, START};

use super::add_announcers;
use crate::RunError;

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let schema = StateSchema::builder()
        .field_with_default("aggregate", Reducer::Append, json!([]))
        .field("which", Reducer::LastWins)
        .build()?;
    let mut graph = StateGraph::new(schema);
    add_announcers(&mut graph, &["a", "b", "c", "d", "e"]);
    graph
        .add_edge(START, "a")
        .add_conditional_edges(
            "a",
            |state| {
                if state.get_str("which") == Some("cd") {
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
    Ok(graph)
}

pub(super) fn input(which: Option<&str>) -> PartialUpdate {
    PartialUpdate::new()
        .with("aggregate", json!([]))
        .with("which", which.unwrap_or("bc"))
}
