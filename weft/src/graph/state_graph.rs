//! State graph: named nodes, static edges and conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using
//! `START` and `END` for entry and exit, and use `add_conditional_edges` to
//! pick successors from state. Then `compile` or `compile_with_checkpointer`
//! to get a `CompiledStateGraph`.
//!
//! # Fan-out
//!
//! Several static edges from the same node run all their destinations in the
//! next step. A router may also return several names. Destinations reached
//! from more than one node in the same step run once.
//!
//! # Terminal nodes
//!
//! A node without outgoing edges ends its branch; `add_edge(node, END)` is
//! the explicit form of the same thing.

use std::collections::HashSet;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, NextEntry, Route};
use crate::graph::node::Node;
use crate::memory::{Checkpointer, Store};
use crate::state::{StateSchema, StateSnapshot};

/// Sentinel for graph entry: use as `from` in `add_edge(START, first_node)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to` in `add_edge(last_node, END)`.
pub const END: &str = "__end__";

/// State graph builder.
///
/// **Interaction**: accepts `Arc<dyn Node>`; produces `CompiledStateGraph`.
/// Errors are collected and reported by `compile`, so calls chain freely.
pub struct StateGraph {
    schema: StateSchema,
    /// Nodes in registration order; this order decides merge order within a step.
    nodes: Vec<(String, Arc<dyn Node>)>,
    duplicate_nodes: Vec<String>,
    edges: Vec<(String, String)>,
    conditional_edges: Vec<(String, ConditionalRouter)>,
    store: Option<Arc<dyn Store>>,
}

impl StateGraph {
    /// Creates an empty graph over `schema`.
    pub fn new(schema: StateSchema) -> Self {
        Self {
            schema,
            nodes: Vec::new(),
            duplicate_nodes: Vec::new(),
            edges: Vec::new(),
            conditional_edges: Vec::new(),
            store: None,
        }
    }

    /// Attaches a shared store; nodes reach it through `NodeContext::store`.
    pub fn with_store(self, store: Arc<dyn Store>) -> Self {
        Self {
            store: Some(store),
            ..self
        }
    }

    /// Adds a node. Names must be unique; a repeated name fails `compile`.
    pub fn add_node(&mut self, name: impl Into<String>, node: Arc<dyn Node>) -> &mut Self {
        let name = name.into();
        if self.nodes.iter().any(|(n, _)| *n == name) {
            self.duplicate_nodes.push(name);
        } else {
            self.nodes.push((name, node));
        }
        self
    }

    /// Adds a static edge. Use `START` for entry and `END` for exit.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Adds conditional edges from `source`: after the step in which `source`
    /// ran commits, `path(state)` picks the successor(s) among `destinations`.
    ///
    /// Calling it again for the same source replaces the earlier router. A
    /// source must not also have static edges.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "a",
    ///     |s| if s.get_str("which") == Some("cd") { vec!["c", "d"] } else { vec!["b", "c"] },
    ///     ["b", "c", "d"],
    /// );
    /// ```
    pub fn add_conditional_edges<F, R, I, T>(
        &mut self,
        source: impl Into<String>,
        path: F,
        destinations: I,
    ) -> &mut Self
    where
        F: Fn(&StateSnapshot) -> R + Send + Sync + 'static,
        R: Into<Route>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let source = source.into();
        let router = ConditionalRouter::new(
            Arc::new(move |s: &StateSnapshot| path(s).into()),
            destinations.into_iter().map(Into::into).collect(),
        );
        match self.conditional_edges.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = router,
            None => self.conditional_edges.push((source, router)),
        }
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer. Runs whose config has
    /// a `thread_id` are checkpointed after every step and can be interrupted
    /// and resumed.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Result<CompiledStateGraph, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer>>,
    ) -> Result<CompiledStateGraph, CompilationError> {
        if let Some(name) = self.duplicate_nodes.first() {
            return Err(CompilationError::DuplicateNode(name.clone()));
        }
        if let Some((name, _)) = self.nodes.iter().find(|(n, _)| n == START || n == END) {
            return Err(CompilationError::ReservedNodeName(name.clone()));
        }
        let known: HashSet<&str> = self.nodes.iter().map(|(n, _)| n.as_str()).collect();

        for (from, to) in &self.edges {
            if from == END {
                return Err(CompilationError::EdgeOutOfEnd(to.clone()));
            }
            if to == START {
                return Err(CompilationError::EdgeIntoStart(from.clone()));
            }
            if from != START && !known.contains(from.as_str()) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !known.contains(to.as_str()) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if source == END {
                return Err(CompilationError::EdgeOutOfEnd(
                    router.destinations().join(","),
                ));
            }
            if source != START && !known.contains(source.as_str()) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            for target in router.destinations() {
                if target == START {
                    return Err(CompilationError::EdgeIntoStart(source.clone()));
                }
                if target != END && !known.contains(target.as_str()) {
                    return Err(CompilationError::InvalidConditionalDestination {
                        from: source.clone(),
                        target: target.clone(),
                    });
                }
            }
            if self.edges.iter().any(|(f, _)| f == source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
        }

        let has_start = self.edges.iter().any(|(f, _)| f == START)
            || self.conditional_edges.iter().any(|(s, _)| s == START);
        if !has_start {
            return Err(CompilationError::MissingStart);
        }

        let mut next_map = std::collections::HashMap::new();
        for (from, to) in &self.edges {
            let entry = next_map
                .entry(from.clone())
                .or_insert_with(|| NextEntry::Static(Vec::new()));
            if let NextEntry::Static(targets) = entry {
                if !targets.contains(to) {
                    targets.push(to.clone());
                }
            }
        }
        for (source, router) in self.conditional_edges {
            next_map.insert(source, NextEntry::Conditional(router));
        }

        Ok(CompiledStateGraph::new(
            self.schema,
            self.nodes,
            next_map,
            checkpointer,
            self.store,
        ))
    }
}
