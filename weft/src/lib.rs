//! # Weft
//!
//! A state-graph executor for agent workflows. State is a JSON object with a
//! declared schema; nodes read a snapshot and return partial updates that
//! per-field reducers merge; edges (static or routed from state) decide what
//! runs next. Runs are checkpointed per thread, so they can be suspended for
//! human input and resumed later, or continued as multi-turn conversations.
//!
//! ## Design principles
//!
//! - **Snapshots in, updates out**: nodes never mutate state; the executor
//!   merges their [`PartialUpdate`]s through the [`StateSchema`]'s [`Reducer`]s.
//! - **Steps**: all active nodes of a step run concurrently on the same
//!   snapshot; updates commit together in node registration order.
//! - **Explicit suspension**: a node returns [`NodeOutput::Suspend`] instead
//!   of unwinding; the caller answers with [`Command::resume`].
//! - **Injected persistence**: a [`Checkpointer`] and a [`Store`] are passed
//!   to the graph at build time; there are no globals.
//!
//! ## Main modules
//!
//! - [`state`]: [`StateSchema`], [`StateSnapshot`], [`PartialUpdate`].
//! - [`channels`]: [`Reducer`] (`Append`, `LastWins`, `Custom`).
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], routing,
//!   interrupts, logging, DOT/Mermaid export.
//! - [`memory`]: [`Checkpointer`] ([`MemorySaver`], [`SqliteSaver`]),
//!   [`Store`] ([`InMemoryStore`], [`SqliteStore`]), [`RunnableConfig`].
//! - [`stream`]: [`StreamMode`], [`StreamEvent`].
//! - [`llm`], [`tool_source`], [`retrieval`]: collaborator traits with mock
//!   implementations.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use weft::{
//!     sync_node, MemorySaver, PartialUpdate, Reducer, RunnableConfig, StateGraph,
//!     StateSchema, END, START,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = StateSchema::builder()
//!     .field_with_default("aggregate", Reducer::Append, json!([]))
//!     .build()?;
//! let mut graph = StateGraph::new(schema);
//! for (name, tag) in [("a", "I'm A"), ("b", "I'm B"), ("c", "I'm C"), ("d", "I'm D")] {
//!     graph.add_node(name, sync_node(move |_, _| {
//!         Ok(PartialUpdate::new().with("aggregate", json!([tag])).into())
//!     }));
//! }
//! graph
//!     .add_edge(START, "a")
//!     .add_edge("a", "b")
//!     .add_edge("a", "c")
//!     .add_edge("b", "d")
//!     .add_edge("c", "d")
//!     .add_edge("d", END);
//! let compiled = graph.compile_with_checkpointer(Arc::new(MemorySaver::new()))?;
//! let out = compiled
//!     .invoke(PartialUpdate::new(), Some(RunnableConfig::for_thread("1")))
//!     .await?;
//! assert_eq!(out.state.get("aggregate"), Some(&json!(["I'm A", "I'm B", "I'm C", "I'm D"])));
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod retrieval;
pub mod state;
pub mod stream;
pub mod tool_source;

pub use channels::{Reducer, ReducerFn};
pub use error::{GraphError, NodeError};
pub use graph::{
    generate_dot, generate_mermaid, node_fn, sync_node, Command, CompilationError,
    CompiledStateGraph, GraphInput, GraphOutput, Interrupt, Node, NodeContext, NodeOutput, Route,
    StateGraph, END, START,
};
pub use llm::{LlmClient, LlmResponse, MockLlm, ToolCall};
pub use memory::{
    namespace, Checkpoint, CheckpointError, CheckpointSource, Checkpointer, InMemoryStore, Item,
    MemorySaver, Namespace, PendingWrite, RunnableConfig, SqliteSaver, SqliteStore, Store,
    StoreError, DEFAULT_RECURSION_LIMIT,
};
pub use message::Message;
pub use retrieval::{Document, InMemoryRetriever, Retriever};
pub use state::{PartialUpdate, SchemaError, SchemaViolation, StateSchema, StateSnapshot};
pub use stream::{CheckpointEvent, StreamEvent, StreamMode};
pub use tool_source::{MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
