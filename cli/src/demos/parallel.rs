//! Fan-out and fan-in: a→b, a→c, b→d, c→d.

use serde_json::json;
use weft::{PartialUpdate, Reducer, StateGraph, StateSchema, END, START};

use super::add_announcers;
use crate::RunError;

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let schema = StateSchema::builder()
        .field_with_default("aggregate", Reducer::Append, json!([]))
        .build()?;
    let mut graph = StateGraph::new(schema);
    add_announcers(&mut graph, &["a", "b", "c", "d"]);
    graph
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("a", "c")
        .add_edge("b", "d")
        .add_edge("c", "d")
        .add_edge("d", END);
    Ok(graph)
}

pub(super) fn input() -> PartialUpdate {
    PartialUpdate::new().with("aggregate", json!([]))
}
