//! Checkpoint: one persisted step of a thread.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::graph::Interrupt;
use crate::state::{PartialUpdate, StateSnapshot};

/// What produced a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointSource {
    /// Caller input merged into the state, before any node ran.
    Input,
    /// A step committed or suspended inside the run loop.
    Loop,
}

/// Update from a node that completed in a step that was later suspended by a sibling.
///
/// Replayed when the step is resumed so the node does not run twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    pub node: String,
    pub update: PartialUpdate,
}

/// Persisted state of one thread at one step.
///
/// `step` is strictly increasing per thread and keeps counting across
/// invocations. `next` is the active node set of the step that follows;
/// an empty `next` with no interrupts means the run finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub thread_id: String,
    pub step: i64,
    /// RFC 3339 creation time.
    pub ts: String,
    pub source: CheckpointSource,
    pub state: StateSnapshot,
    pub next: Vec<String>,
    #[serde(default)]
    pub pending_writes: Vec<PendingWrite>,
    #[serde(default)]
    pub interrupts: Vec<Interrupt>,
}

impl Checkpoint {
    /// New checkpoint with a fresh UUID and the current time.
    pub fn new(
        thread_id: impl Into<String>,
        step: i64,
        source: CheckpointSource,
        state: StateSnapshot,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            step,
            ts: Utc::now().to_rfc3339(),
            source,
            state,
            next: Vec::new(),
            pending_writes: Vec::new(),
            interrupts: Vec::new(),
        }
    }

    pub fn with_next(mut self, next: Vec<String>) -> Self {
        self.next = next;
        self
    }

    pub fn with_interrupts(mut self, interrupts: Vec<Interrupt>) -> Self {
        self.interrupts = interrupts;
        self
    }

    pub fn with_pending_writes(mut self, writes: Vec<PendingWrite>) -> Self {
        self.pending_writes = writes;
        self
    }

    /// True when the thread is waiting for a resume value.
    pub fn is_interrupted(&self) -> bool {
        !self.interrupts.is_empty()
    }

    /// True when the run that wrote this checkpoint has nothing left to execute.
    pub fn is_done(&self) -> bool {
        self.next.is_empty() && self.interrupts.is_empty()
    }
}
