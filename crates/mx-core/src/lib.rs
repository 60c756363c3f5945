//! mx-core: stable foundation for the material graph IR.
//!
//! Contains:
//! - ids (compact arena identifiers for document elements)
//! - error (tree-level error types shared by the other crates)

pub mod error;
pub mod ids;

// Re-exports: nice ergonomics for downstream crates
pub use error::{MxError, MxResult};
pub use ids::*;
