//! Checkpointer trait and CheckpointError.

use async_trait::async_trait;

use crate::memory::checkpoint::Checkpoint;

/// Error type for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    /// `save` was given a step that is not after the thread's latest checkpoint.
    #[error("out of order: thread `{thread_id}` is at step {latest}, got step {step}")]
    OutOfOrder {
        thread_id: String,
        latest: i64,
        step: i64,
    },
}

impl From<serde_json::Error> for CheckpointError {
    fn from(e: serde_json::Error) -> Self {
        CheckpointError::Serialization(e.to_string())
    }
}

/// Persists checkpoints per thread, totally ordered by step.
///
/// **Interaction**: injected with `StateGraph::compile_with_checkpointer`;
/// `CompiledStateGraph` uses it whenever the invocation config has a
/// `thread_id`.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Persists `checkpoint` and returns its id.
    ///
    /// Fails with [`CheckpointError::OutOfOrder`] when `checkpoint.step` is not
    /// strictly greater than the latest saved step of the same thread.
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String, CheckpointError>;

    /// Most recently saved checkpoint of the thread, or `None` if it never ran.
    async fn load_latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Checkpoints of the thread, oldest first. With `limit`, only the most recent `limit`.
    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Checkpoint>, CheckpointError>;
}
