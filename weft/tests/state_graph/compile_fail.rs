//! StateGraph compile failure cases.

use weft::{CompilationError, StateGraph, END, START};

use crate::common::{aggregate_schema, say};

/// **Scenario**: An edge to a node that was never added fails with NodeNotFound.
#[test]
fn edge_to_unknown_node() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_edge(START, "a")
        .add_edge("a", "missing");

    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        Err(e) => panic!("expected NodeNotFound, got {:?}", e),
        Ok(_) => panic!("expected NodeNotFound"),
    }
}

/// **Scenario**: A graph without an edge out of START fails with MissingStart.
#[test]
fn missing_start() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph.add_node("a", say("A")).add_edge("a", END);
    assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));
}

/// **Scenario**: Adding the same node name twice fails with DuplicateNode.
#[test]
fn duplicate_node() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("a", say("again"))
        .add_edge(START, "a");
    match graph.compile() {
        Err(CompilationError::DuplicateNode(id)) => assert_eq!(id, "a"),
        other => panic!("expected DuplicateNode, got {:?}", other.err()),
    }
}

/// **Scenario**: A router destination that is not a node fails at compile time.
#[test]
fn conditional_destination_must_exist() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("b", say("B"))
        .add_edge(START, "a")
        .add_conditional_edges("a", |_| "b", ["b", "ghost"]);
    match graph.compile() {
        Err(CompilationError::InvalidConditionalDestination { from, target }) => {
            assert_eq!(from, "a");
            assert_eq!(target, "ghost");
        }
        other => panic!("expected InvalidConditionalDestination, got {:?}", other.err()),
    }
}

/// **Scenario**: A node cannot have both static edges and a router.
#[test]
fn edge_and_router_on_same_source() {
    let mut graph = StateGraph::new(aggregate_schema());
    graph
        .add_node("a", say("A"))
        .add_node("b", say("B"))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_conditional_edges("a", |_| END, ["b", END]);
    match graph.compile() {
        Err(CompilationError::NodeHasBothEdgeAndConditional(id)) => assert_eq!(id, "a"),
        other => panic!("expected NodeHasBothEdgeAndConditional, got {:?}", other.err()),
    }
}
