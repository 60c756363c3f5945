//! mx-graph: graph IR and transformation passes for node-based material descriptions.
//!
//! Provides:
//! - The element tree (`Document`) owning nodes, node graphs, ports and definitions
//! - Name-based port connections and derived dataflow edges
//! - Definition and implementation resolution per target
//! - Topological evaluation order with cycle detection
//! - Subgraph flattening (inlining of graph-backed nodes)
//! - Structural validation
//!
//! # Example
//!
//! ```
//! use mx_graph::Document;
//!
//! let mut doc = Document::new();
//! let graph = doc.add_node_graph(doc.root(), "NG_main").unwrap();
//! let a = doc.add_node(graph, "constant", "a", "float").unwrap();
//! let b = doc.add_node(graph, "multiply", "b", "float").unwrap();
//! doc.set_connected_node(b, "in1", Some(a)).unwrap();
//!
//! assert_eq!(doc.connected_node(b, "in1"), Some(a));
//! assert_eq!(doc.topological_sort(graph).unwrap(), vec![a, b]);
//! ```

pub mod document;
pub mod edge;
pub mod error;
pub mod flatten;
pub mod port;
pub mod resolve;
pub mod topo;
pub mod validate;

// Re-exports for ergonomics
pub use document::{Document, Element, ElementKind};
pub use edge::Edge;
pub use error::{GraphError, GraphResult};
pub use flatten::{DEFAULT_MAX_INLINE_DEPTH, FlattenOptions, FlattenSummary};
pub use mx_core::{ElementId, MxError, MxResult};
pub use validate::ValidationIssue;
