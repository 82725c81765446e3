//! Plain retrieval-augmented generation: retrieve documents for the
//! question, then answer from them. No grading and no fallback; compare with
//! the `crag` demo.

use std::sync::Arc;

use weft::{InMemoryRetriever, PartialUpdate, StateGraph, END, START};

use super::crag::{corpus, schema, writer, Generate, Retrieve};
use crate::RunError;

const DEFAULT_QUESTION: &str = "Explain how adversarial prompts attack language models.";

pub(super) fn graph() -> Result<StateGraph, RunError> {
    let mut graph = StateGraph::new(schema()?);
    graph
        .add_node(
            "retrieve",
            Arc::new(Retrieve {
                retriever: Arc::new(InMemoryRetriever::new(corpus())),
            }),
        )
        .add_node("generate", Arc::new(Generate { llm: writer() }))
        .add_edge(START, "retrieve")
        .add_edge("retrieve", "generate")
        .add_edge("generate", END);
    Ok(graph)
}

pub(super) fn input(question: Option<&str>) -> PartialUpdate {
    PartialUpdate::new().with("question", question.unwrap_or(DEFAULT_QUESTION))
}
