//! Graph execution error types.
//!
//! `GraphError` is returned by `CompiledStateGraph::invoke` / `stream` and the
//! state accessors. `NodeError` is what a node callback (or a collaborator it
//! calls) returns; the executor wraps it into `GraphError::NodeFailed`.

use thiserror::Error;

use crate::memory::{CheckpointError, StoreError};
use crate::state::{SchemaViolation, StateSnapshot};

/// Failure inside a node callback: text-generation, tool, retrieval or store
/// errors, or a state value the node could not interpret.
///
/// Not retried by the executor; the step fails and nothing is committed.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A collaborator call failed (model, tool, retrieval).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The node read a state field with an unexpected shape.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Shared-memory store failure.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// Graph run error.
///
/// Every variant is fatal for the current invocation. The checkpointer keeps
/// the last committed checkpoint, so a later `invoke` on the same thread
/// continues from the last good state.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An update (node output or caller input) names a field the schema does not have.
    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    /// A routing function returned a destination that was not declared for its edge.
    #[error("invalid route from `{from}`: `{to}` is not a declared destination")]
    InvalidRoute { from: String, to: String },

    /// The run needed more steps than `RunnableConfig::recursion_limit`.
    ///
    /// `state` is the last committed state.
    #[error("recursion limit of {limit} steps exceeded")]
    RecursionLimitExceeded { limit: usize, state: StateSnapshot },

    /// A resume command was sent to a thread whose latest checkpoint has no interrupt.
    #[error("no pending interrupt for thread `{0}`")]
    NoPendingInterrupt(String),

    /// `GraphInput::Continue` was sent to a thread that has never run.
    #[error("thread `{0}` has no checkpoint to continue from")]
    NothingToContinue(String),

    /// The operation needs a checkpointer and a thread id.
    #[error("{0} requires a checkpointer and a thread_id")]
    CheckpointerRequired(&'static str),

    /// A checkpoint's pending step names a node this graph does not have.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// A node callback failed.
    #[error("node `{node}` failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: NodeError,
    },

    /// Checkpoint persistence failed.
    #[error("checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl GraphError {
    /// Returns the partial state carried by `RecursionLimitExceeded`.
    pub fn partial_state(&self) -> Option<&StateSnapshot> {
        match self {
            GraphError::RecursionLimitExceeded { state, .. } => Some(state),
            _ => None,
        }
    }
}
