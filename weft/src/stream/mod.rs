//! Streaming types for graph runs.
//!
//! `CompiledStateGraph::stream` returns a `Stream` of
//! `Result<StreamEvent, GraphError>`. Which events are sent is controlled by
//! the selected [`StreamMode`]s; an [`StreamEvent::Interrupt`] is always sent
//! when the run suspends and is the last item of that stream.

use std::collections::HashSet;
use std::str::FromStr;

use tokio::sync::mpsc;

use crate::error::GraphError;
use crate::graph::Interrupt;
use crate::memory::Checkpoint;
use crate::state::{PartialUpdate, StateSnapshot};

/// What to emit while a graph runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Full state after the input is applied and after every committed step.
    Values,
    /// Each node's partial update, in merge order, after its step commits.
    Updates,
    /// One event per saved checkpoint.
    Checkpoints,
}

impl FromStr for StreamMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "values" => Ok(StreamMode::Values),
            "updates" => Ok(StreamMode::Updates),
            "checkpoints" => Ok(StreamMode::Checkpoints),
            other => Err(format!("unknown stream mode: {}", other)),
        }
    }
}

/// Checkpoint event emitted when a checkpoint is saved.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointEvent {
    pub checkpoint_id: String,
    pub thread_id: String,
    pub step: i64,
    pub timestamp: String,
    /// Active node set of the following step.
    pub next: Vec<String>,
}

impl From<&Checkpoint> for CheckpointEvent {
    fn from(cp: &Checkpoint) -> Self {
        Self {
            checkpoint_id: cp.id.clone(),
            thread_id: cp.thread_id.clone(),
            step: cp.step,
            timestamp: cp.ts.clone(),
            next: cp.next.clone(),
        }
    }
}

/// Item of a graph stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Values(StateSnapshot),
    Updates { node: String, update: PartialUpdate },
    Checkpoint(CheckpointEvent),
    /// The run suspended; terminal.
    Interrupt(Vec<Interrupt>),
}

/// Sending half used by the run loop; filters events by mode.
pub(crate) struct EventSink {
    tx: mpsc::Sender<Result<StreamEvent, GraphError>>,
    modes: HashSet<StreamMode>,
}

impl EventSink {
    pub(crate) fn new(
        tx: mpsc::Sender<Result<StreamEvent, GraphError>>,
        modes: HashSet<StreamMode>,
    ) -> Self {
        Self { tx, modes }
    }

    async fn send(&self, item: Result<StreamEvent, GraphError>) {
        // Receiver gone: keep running, nobody is listening.
        let _ = self.tx.send(item).await;
    }

    pub(crate) async fn values(&self, state: &StateSnapshot) {
        if self.modes.contains(&StreamMode::Values) {
            self.send(Ok(StreamEvent::Values(state.clone()))).await;
        }
    }

    pub(crate) async fn update(&self, node: &str, update: &PartialUpdate) {
        if self.modes.contains(&StreamMode::Updates) {
            self.send(Ok(StreamEvent::Updates {
                node: node.to_string(),
                update: update.clone(),
            }))
            .await;
        }
    }

    pub(crate) async fn checkpoint(&self, checkpoint: &Checkpoint) {
        if self.modes.contains(&StreamMode::Checkpoints) {
            self.send(Ok(StreamEvent::Checkpoint(checkpoint.into()))).await;
        }
    }

    pub(crate) async fn interrupt(&self, interrupts: &[Interrupt]) {
        self.send(Ok(StreamEvent::Interrupt(interrupts.to_vec()))).await;
    }

    pub(crate) async fn error(&self, error: GraphError) {
        self.send(Err(error)).await;
    }
}
