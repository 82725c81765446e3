//! State graph: build with `StateGraph`, compile, then `invoke` or `stream`.
//!
//! Nodes run in steps; updates are merged through the schema's reducers; a
//! checkpointer makes threads resumable and lets nodes suspend for input.

mod compile_error;
mod compiled;
mod conditional;
mod context;
mod interrupt;
pub mod logging;
mod node;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, GraphOutput};
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry, Route};
pub use context::NodeContext;
pub use interrupt::{Command, GraphInput, Interrupt};
pub use node::{node_fn, sync_node, Node, NodeOutput};
pub use state_graph::{StateGraph, END, START};
pub use visualization::{generate_dot, generate_mermaid};
