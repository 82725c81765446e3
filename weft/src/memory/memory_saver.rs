//! In-memory checkpointer (MemorySaver).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::memory::checkpoint::Checkpoint;
use crate::memory::checkpointer::{CheckpointError, Checkpointer};

/// In-memory checkpointer keyed by thread id.
///
/// Not persistent; for tests and single-process runs. Each thread's history
/// is a `Vec` in step order.
#[derive(Default)]
pub struct MemorySaver {
    inner: RwLock<HashMap<String, Vec<Checkpoint>>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String, CheckpointError> {
        let mut guard = self.inner.write().await;
        let history = guard.entry(checkpoint.thread_id.clone()).or_default();
        if let Some(latest) = history.last() {
            if checkpoint.step <= latest.step {
                return Err(CheckpointError::OutOfOrder {
                    thread_id: checkpoint.thread_id.clone(),
                    latest: latest.step,
                    step: checkpoint.step,
                });
            }
        }
        history.push(checkpoint.clone());
        Ok(checkpoint.id.clone())
    }

    async fn load_latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let guard = self.inner.read().await;
        Ok(guard.get(thread_id).and_then(|h| h.last().cloned()))
    }

    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Checkpoint>, CheckpointError> {
        let guard = self.inner.read().await;
        let history = match guard.get(thread_id) {
            Some(h) => h,
            None => return Ok(Vec::new()),
        };
        let skip = limit.map_or(0, |n| history.len().saturating_sub(n));
        Ok(history[skip..].to_vec())
    }
}
