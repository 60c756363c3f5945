//! Graph-specific error types.

use mx_core::MxError;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Failures raised by the graph passes.
///
/// Resolution misses (no matching definition or implementation) are never
/// errors; they surface as `None` from the lookup functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The children of a graph could not be ordered because their connections form a cycle.
    #[error("Encountered a cycle in graph: {graph}")]
    CycleDetected { graph: String },

    /// A graph pass was asked to run on something that is not a node graph.
    #[error("Element '{name}' is a {kind}, not a nodegraph")]
    NotAGraph { name: String, kind: &'static str },

    /// Subgraph inlining went deeper than the configured limit.
    #[error("Inlining depth limit {depth} reached while expanding node '{node}'")]
    InliningDepthExceeded { node: String, depth: usize },

    #[error(transparent)]
    Core(#[from] MxError),
}
