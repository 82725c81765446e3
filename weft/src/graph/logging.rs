//! Logging helpers for graph execution.
//!
//! Structured `tracing` events for run start/end, steps, node execution,
//! merges, routing, checkpoints and interrupts.

use crate::error::GraphError;

/// Log graph execution start.
pub fn log_graph_start(thread_id: Option<&str>) {
    tracing::info!(thread_id = thread_id, "Starting graph execution");
}

/// Log graph execution completion (`interrupts` > 0 means the run suspended).
pub fn log_graph_complete(steps: usize, interrupts: usize) {
    tracing::info!(steps, interrupts, "Graph execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(error: &GraphError) {
    tracing::error!(%error, "Graph execution error");
}

/// Log the active node set of a step.
pub fn log_step_start(step: i64, active: &[String]) {
    tracing::debug!(step, ?active, "Starting step");
}

/// Log node execution start.
pub fn log_node_start(node: &str, step: i64) {
    tracing::debug!(node, step, "Starting node execution");
}

/// Log node execution completion; `outcome` is `continue` or `suspend`.
pub fn log_node_complete(node: &str, outcome: &str) {
    tracing::debug!(node, outcome, "Node execution complete");
}

/// Log a committed merge.
pub fn log_state_update(step: i64, writers: &[&str]) {
    tracing::debug!(step, ?writers, "State updated");
}

/// Log a resolved edge.
pub fn log_routing(from: &str, to: &str) {
    tracing::trace!(from, to, "Route");
}

/// Log a saved checkpoint.
pub fn log_checkpoint_saved(thread_id: &str, step: i64, checkpoint_id: &str) {
    tracing::debug!(thread_id, step, checkpoint_id, "Checkpoint saved");
}

/// Log a node suspending the run.
pub fn log_interrupt(node: &str, step: i64) {
    tracing::info!(node, step, "Node suspended run");
}

/// Log a resume of a suspended thread.
pub fn log_resume(thread_id: &str, nodes: &[String]) {
    tracing::info!(thread_id, ?nodes, "Resuming suspended step");
}
