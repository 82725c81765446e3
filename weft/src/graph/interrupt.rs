//! Interrupts and graph inputs.
//!
//! A node suspends by returning `NodeOutput::Suspend(payload)`; the executor
//! records an [`Interrupt`] in the checkpoint and returns it to the caller.
//! The caller answers with `GraphInput::Resume(Command::resume(value))` on
//! the same thread.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::PartialUpdate;

/// Pending suspension surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    /// Unique id of this interrupt.
    pub id: String,
    /// Node that suspended.
    pub node: String,
    /// Payload passed by the node (e.g. the text to review).
    pub value: Value,
}

impl Interrupt {
    pub fn new(node: impl Into<String>, value: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            node: node.into(),
            value,
        }
    }
}

/// Resume command: the value handed back to the suspended node(s).
///
/// Every node suspended in the pending step receives the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub resume: Value,
}

impl Command {
    pub fn resume(value: impl Into<Value>) -> Self {
        Self {
            resume: value.into(),
        }
    }
}

/// Input to `invoke` / `stream`.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphInput {
    /// Fresh input merged into the thread's state; execution starts at START.
    Values(PartialUpdate),
    /// Answer the pending interrupt of the thread.
    Resume(Command),
    /// Re-run the pending step recorded in the thread's latest checkpoint.
    Continue,
}

impl From<PartialUpdate> for GraphInput {
    fn from(update: PartialUpdate) -> Self {
        GraphInput::Values(update)
    }
}

impl From<Command> for GraphInput {
    fn from(cmd: Command) -> Self {
        GraphInput::Resume(cmd)
    }
}
