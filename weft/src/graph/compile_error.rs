//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the node/edge table is inconsistent.

use thiserror::Error;

/// Error when compiling a state graph.
///
/// A node without outgoing edges is allowed (it is terminal); an explicit
/// edge to END is not required.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// `add_node` was called twice with the same name.
    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    /// START or END was used as a node name.
    #[error("reserved name used as node: {0}")]
    ReservedNodeName(String),

    /// An edge references a name that was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Neither a static nor a conditional edge leaves START.
    #[error("graph must have an edge from START")]
    MissingStart,

    /// An edge points into START.
    #[error("edge into START from: {0}")]
    EdgeIntoStart(String),

    /// An edge leaves END.
    #[error("edge out of END to: {0}")]
    EdgeOutOfEnd(String),

    /// A node has both a static edge and conditional edges; it must have one kind.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A declared conditional destination is neither a node nor END.
    #[error("conditional edge from `{from}` declares unknown destination: {target}")]
    InvalidConditionalDestination { from: String, target: String },
}
