//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::memory::checkpoint::{Checkpoint, CheckpointSource};
use crate::memory::checkpointer::{CheckpointError, Checkpointer};
use crate::memory::sqlite;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn source_to_str(s: CheckpointSource) -> &'static str {
    match s {
        CheckpointSource::Input => "input",
        CheckpointSource::Loop => "loop",
    }
}

/// SQLite-backed checkpointer. Key: (thread_id, step).
///
/// The whole checkpoint is stored as a JSON payload; `step`, `ts` and
/// `source` are duplicated into columns for ordering and inspection. Each
/// call opens its own connection inside `spawn_blocking`; a save holds the
/// write lock for its whole check-then-insert, and waits for other writers.
///
/// **Interaction**: used as `Arc<dyn Checkpointer>` in
/// `StateGraph::compile_with_checkpointer`; the CLI resumes interrupted
/// threads from a later process through it.
pub struct SqliteSaver {
    db_path: PathBuf,
}

impl SqliteSaver {
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = sqlite::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                thread_id TEXT NOT NULL,
                step INTEGER NOT NULL,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                source TEXT NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (thread_id, step)
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl Checkpointer for SqliteSaver {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String, CheckpointError> {
        let payload = serde_json::to_string(checkpoint)?;
        let thread_id = checkpoint.thread_id.clone();
        let step = checkpoint.step;
        let id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let source = source_to_str(checkpoint.source);
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = sqlite::open(&db_path).map_err(storage)?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(storage)?;
            let latest: Option<i64> = tx
                .query_row(
                    "SELECT MAX(step) FROM checkpoints WHERE thread_id = ?1",
                    params![thread_id],
                    |row| row.get(0),
                )
                .map_err(storage)?;
            if let Some(latest) = latest {
                if step <= latest {
                    return Err(CheckpointError::OutOfOrder {
                        thread_id,
                        latest,
                        step,
                    });
                }
            }
            tx.execute(
                r#"
                INSERT INTO checkpoints (thread_id, step, checkpoint_id, ts, source, payload)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![thread_id, step, id, ts, source, payload],
            )
            .map_err(storage)?;
            tx.commit().map_err(storage)?;
            Ok::<String, CheckpointError>(id)
        })
        .await
        .map_err(storage)?
    }

    async fn load_latest(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let thread_id = thread_id.to_string();
        let db_path = self.db_path.clone();

        let payload: Option<String> = tokio::task::spawn_blocking(move || {
            let conn = sqlite::open(&db_path).map_err(storage)?;
            conn.query_row(
                "SELECT payload FROM checkpoints WHERE thread_id = ?1 ORDER BY step DESC LIMIT 1",
                params![thread_id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(storage)??;

        match payload {
            Some(p) => Ok(Some(serde_json::from_str(&p)?)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Checkpoint>, CheckpointError> {
        let thread_id = thread_id.to_string();
        // SQLite treats a negative LIMIT as "no limit".
        let limit: i64 = limit.map_or(-1, |n| n as i64);
        let db_path = self.db_path.clone();

        let payloads: Vec<String> = tokio::task::spawn_blocking(move || {
            let conn = sqlite::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT payload FROM checkpoints WHERE thread_id = ?1 ORDER BY step DESC LIMIT ?2",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![thread_id, limit], |row| row.get::<_, String>(0))
                .map_err(storage)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(storage)?);
            }
            Ok::<_, CheckpointError>(out)
        })
        .await
        .map_err(storage)??;

        let mut checkpoints = payloads
            .iter()
            .map(|p| serde_json::from_str::<Checkpoint>(p))
            .collect::<Result<Vec<_>, _>>()?;
        checkpoints.reverse();
        Ok(checkpoints)
    }
}
