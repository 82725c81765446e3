//! CLI error type.

use thiserror::Error;
use weft::{CheckpointError, CompilationError, GraphError, SchemaError, StoreError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config: {0}")]
    Config(#[from] weft_config::LoadError),
    #[error("invalid state schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("graph does not compile: {0}")]
    Compile(#[from] CompilationError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("thread `{0}` has no checkpoints")]
    NoCheckpoint(String),
    #[error("logging: {0}")]
    Logging(String),
}
