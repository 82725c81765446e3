//! Context passed into nodes.
//!
//! Holds the invocation config (thread id, user id), the optional shared
//! store, the step number, and the resume value when the node is being
//! re-run after an interrupt.
//!
//! ```rust,ignore
//! async fn run(&self, state: &StateSnapshot, ctx: &NodeContext) -> Result<NodeOutput, NodeError> {
//!     let edited = match ctx.interrupt(json!({"text_to_revise": state.get("text")})) {
//!         Ok(answer) => answer,
//!         Err(suspend) => return Ok(suspend),
//!     };
//!     Ok(PartialUpdate::new().with("text", edited).into())
//! }
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::error::NodeError;
use crate::graph::node::NodeOutput;
use crate::memory::{RunnableConfig, Store};

/// Per-node execution context. Cheap to clone.
#[derive(Clone)]
pub struct NodeContext {
    node: String,
    step: i64,
    config: RunnableConfig,
    store: Option<Arc<dyn Store>>,
    resume: Option<Value>,
}

impl NodeContext {
    pub fn new(
        node: impl Into<String>,
        step: i64,
        config: RunnableConfig,
        store: Option<Arc<dyn Store>>,
        resume: Option<Value>,
    ) -> Self {
        Self {
            node: node.into(),
            step,
            config,
            store,
            resume,
        }
    }

    /// Name of the node being run.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Checkpoint step this execution will commit as.
    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn config(&self) -> &RunnableConfig {
        &self.config
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.config.thread_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.config.user_id.as_deref()
    }

    pub fn store(&self) -> Option<&Arc<dyn Store>> {
        self.store.as_ref()
    }

    /// Store, or an error when the graph was compiled without one.
    pub fn require_store(&self) -> Result<&Arc<dyn Store>, NodeError> {
        self.store
            .as_ref()
            .ok_or_else(|| NodeError::ExecutionFailed(format!("node `{}` needs a store", self.node)))
    }

    /// Value supplied by `Command::resume` when this node is re-run after suspending.
    pub fn resume_value(&self) -> Option<&Value> {
        self.resume.as_ref()
    }

    /// Suspend point: `Ok(resume value)` when resuming, otherwise
    /// `Err(NodeOutput::Suspend(payload))` for the node to return.
    pub fn interrupt(&self, payload: Value) -> Result<Value, NodeOutput> {
        match &self.resume {
            Some(v) => Ok(v.clone()),
            None => Err(NodeOutput::Suspend(payload)),
        }
    }
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("node", &self.node)
            .field("step", &self.step)
            .field("config", &self.config)
            .field("store", &self.store.as_ref().map(|_| "<store>"))
            .field("resume", &self.resume)
            .finish()
    }
}
