//! # Memory: checkpointing and the shared store
//!
//! Two separate persistence concerns:
//!
//! 1. **Checkpointer**: per-thread, strictly ordered state snapshots. The
//!    executor saves one after the input is applied, after every committed
//!    step, and when a step suspends. Resuming and multi-turn conversations
//!    read the latest one back.
//! 2. **Store**: cross-thread key/value memory scoped by a [`Namespace`]
//!    (e.g. `["memories", user_id]`). Nodes reach it through
//!    [`NodeContext::store`](crate::graph::NodeContext::store).
//!
//! | Type              | Persistence | Use case                 |
//! |-------------------|-------------|--------------------------|
//! | [`MemorySaver`]   | In-memory   | Tests, single process    |
//! | [`SqliteSaver`]   | SQLite file | Resume across processes  |
//! | [`InMemoryStore`] | In-memory   | Tests, single process    |
//! | [`SqliteStore`]   | SQLite file | Durable cross-thread facts |
//!
//! [`RunnableConfig`] carries the thread id, user id and recursion limit for
//! one invocation.

mod checkpoint;
mod checkpointer;
mod config;
mod in_memory_store;
mod memory_saver;
mod sqlite;
mod sqlite_saver;
mod sqlite_store;
mod store;

pub use checkpoint::{Checkpoint, CheckpointSource, PendingWrite};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::{RunnableConfig, DEFAULT_RECURSION_LIMIT};
pub use in_memory_store::InMemoryStore;
pub use memory_saver::MemorySaver;
pub use sqlite_saver::SqliteSaver;
pub use sqlite_store::SqliteStore;
pub use store::{namespace, Item, Namespace, Store, StoreError};
