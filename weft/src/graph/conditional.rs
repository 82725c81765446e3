//! Conditional edges: route to the next node(s) based on state.
//!
//! A source node has a routing function that takes the post-merge state and
//! returns one destination or several (fan-out). Every destination must have
//! been declared when the edge was added.
//!
//! **Interaction**: built by `StateGraph::add_conditional_edges`; resolved by
//! the `CompiledStateGraph` run loop after each step commits.

use std::sync::Arc;

use crate::error::GraphError;
use crate::state::StateSnapshot;

/// Routing result: one branch or a fan-out to several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    One(String),
    Many(Vec<String>),
}

impl Route {
    pub fn into_targets(self) -> Vec<String> {
        match self {
            Route::One(t) => vec![t],
            Route::Many(ts) => ts,
        }
    }
}

impl From<&str> for Route {
    fn from(s: &str) -> Self {
        Route::One(s.to_string())
    }
}

impl From<String> for Route {
    fn from(s: String) -> Self {
        Route::One(s)
    }
}

impl From<Vec<&str>> for Route {
    fn from(v: Vec<&str>) -> Self {
        Route::Many(v.into_iter().map(String::from).collect())
    }
}

impl From<Vec<String>> for Route {
    fn from(v: Vec<String>) -> Self {
        Route::Many(v)
    }
}

/// Router function: reads state, returns the destination(s).
pub type ConditionalRouterFn = Arc<dyn Fn(&StateSnapshot) -> Route + Send + Sync>;

/// Conditional edge definition: routing function plus declared destinations.
#[derive(Clone)]
pub struct ConditionalRouter {
    pub(super) path: ConditionalRouterFn,
    pub(super) destinations: Vec<String>,
}

impl ConditionalRouter {
    pub fn new(path: ConditionalRouterFn, destinations: Vec<String>) -> Self {
        Self { path, destinations }
    }

    /// Names this router may return (node names or END).
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    /// Runs the router and checks every returned name against the declared set.
    pub fn resolve(&self, source: &str, state: &StateSnapshot) -> Result<Vec<String>, GraphError> {
        let targets = (self.path)(state).into_targets();
        if let Some(bad) = targets.iter().find(|t| !self.destinations.contains(t)) {
            return Err(GraphError::InvalidRoute {
                from: source.to_string(),
                to: bad.clone(),
            });
        }
        Ok(targets)
    }
}

/// Outgoing edges of one node (or START) in the compiled graph.
#[derive(Clone)]
pub enum NextEntry {
    /// Static successors; several entries fan out in the same step.
    Static(Vec<String>),
    /// Successors chosen by a router from the post-merge state.
    Conditional(ConditionalRouter),
}
