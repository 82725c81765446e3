//! Shared fixtures: the aggregate schema and tag-pushing nodes.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use weft::{
    sync_node, Node, PartialUpdate, Reducer, RunnableConfig, StateGraph, StateSchema,
    StateSnapshot, END, START,
};

/// `aggregate`: appended list of visit tags; `which`: routing key.
pub fn aggregate_schema() -> StateSchema {
    StateSchema::builder()
        .field_with_default("aggregate", Reducer::Append, json!([]))
        .field("which", Reducer::LastWins)
        .build()
        .expect("aggregate schema")
}

/// Node that appends `"I'm <tag>"` to `aggregate`.
pub fn say(tag: &str) -> Arc<dyn Node> {
    let line = format!("I'm {}", tag);
    sync_node(move |_, _| {
        Ok(PartialUpdate::new()
            .with("aggregate", json!([line.clone()]))
            .into())
    })
}

/// a -> b, a -> c, b -> d, c -> d.
pub fn diamond() -> StateGraph {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("b", say("B"))
        .add_node("c", say("C"))
        .add_node("d", say("D"))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("a", "c")
        .add_edge("b", "d")
        .add_edge("c", "d")
        .add_edge("d", END);
    graph
}

pub fn thread(id: &str) -> Option<RunnableConfig> {
    Some(RunnableConfig::for_thread(id))
}

pub fn aggregate(state: &StateSnapshot) -> Vec<String> {
    state
        .get_array("aggregate")
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}
