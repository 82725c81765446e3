//! Node trait and NodeOutput.
//!
//! A node reads the step-start snapshot and either returns a partial update
//! or asks to suspend the run with a payload for the caller.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::NodeError;
use crate::graph::context::NodeContext;
use crate::state::{PartialUpdate, StateSnapshot};

/// Result of one node execution.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    /// Continue with these field updates (possibly empty).
    Continue(PartialUpdate),
    /// Suspend the run and surface `payload` to the caller as an interrupt.
    Suspend(Value),
}

impl NodeOutput {
    /// `Continue` with an empty update.
    pub fn empty() -> Self {
        NodeOutput::Continue(PartialUpdate::new())
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeOutput::Continue(_) => "continue",
            NodeOutput::Suspend(_) => "suspend",
        }
    }
}

impl From<PartialUpdate> for NodeOutput {
    fn from(update: PartialUpdate) -> Self {
        NodeOutput::Continue(update)
    }
}

/// One unit of work in the graph.
///
/// Nodes of the same step run concurrently and all see the same snapshot;
/// none observes another's update before the step commits.
///
/// **Interaction**: registered with `StateGraph::add_node`; called by the
/// executor with the step-start state and a [`NodeContext`].
#[async_trait]
pub trait Node: Send + Sync {
    async fn run(&self, state: &StateSnapshot, ctx: &NodeContext) -> Result<NodeOutput, NodeError>;
}

struct FnNode<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Node for FnNode<F>
where
    F: Fn(StateSnapshot, NodeContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<NodeOutput, NodeError>> + Send,
{
    async fn run(&self, state: &StateSnapshot, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        (self.f)(state.clone(), ctx.clone()).await
    }
}

struct SyncFnNode<F> {
    f: F,
}

#[async_trait]
impl<F> Node for SyncFnNode<F>
where
    F: Fn(&StateSnapshot, &NodeContext) -> Result<NodeOutput, NodeError> + Send + Sync,
{
    async fn run(&self, state: &StateSnapshot, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
        (self.f)(state, ctx)
    }
}

/// Wraps an async closure as a node. The closure receives owned copies of
/// the snapshot and context so it can move them into the returned future.
///
/// # Example
///
/// ```rust,ignore
/// let node = node_fn(|state, _ctx| async move {
///     let q = state.get_str("question").unwrap_or_default().to_string();
///     Ok(PartialUpdate::new().with("answer", format!("echo: {}", q)).into())
/// });
/// ```
pub fn node_fn<F, Fut>(f: F) -> Arc<dyn Node>
where
    F: Fn(StateSnapshot, NodeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<NodeOutput, NodeError>> + Send + 'static,
{
    Arc::new(FnNode { f })
}

/// Wraps a synchronous closure as a node.
pub fn sync_node<F>(f: F) -> Arc<dyn Node>
where
    F: Fn(&StateSnapshot, &NodeContext) -> Result<NodeOutput, NodeError> + Send + Sync + 'static,
{
    Arc::new(SyncFnNode { f })
}
