//! Weft console harness.
//!
//! Runs the bundled demo graphs against a SQLite checkpointer and store so a
//! run suspended for human input can be resumed by a later process. The
//! `weft` binary parses arguments and calls into [`commands`]; all output
//! goes to a caller-supplied writer so tests can capture it.

pub mod commands;
pub mod demos;
mod display;
mod error;

pub use commands::{
    graph, history, parse_resume_value, resume, run, state, DiagramFormat, OutputMode,
    RunOptions, RunOutcome,
};
pub use demos::{Demo, DemoInput};
pub use error::RunError;

use std::path::Path;
use std::sync::Arc;

use weft::{Checkpointer, InMemoryStore, MemorySaver, SqliteSaver, SqliteStore, Store};

/// Checkpointer and store shared by every command of one process.
#[derive(Clone)]
pub struct Persistence {
    pub checkpointer: Arc<dyn Checkpointer>,
    pub store: Arc<dyn Store>,
}

impl Persistence {
    /// Checkpoints and store items in one SQLite file; parent directories are created.
    pub fn sqlite(path: &Path) -> Result<Self, RunError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            checkpointer: Arc::new(SqliteSaver::new(path)?),
            store: Arc::new(SqliteStore::new(path)?),
        })
    }

    /// Process-local persistence, lost on exit.
    pub fn in_memory() -> Self {
        Self {
            checkpointer: Arc::new(MemorySaver::new()),
            store: Arc::new(InMemoryStore::new()),
        }
    }
}
