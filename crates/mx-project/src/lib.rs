//! mx-project: document descriptions for the material graph IR.
//!
//! A description is a YAML or JSON file listing node definitions,
//! implementations, node graphs and top-level nodes. Loading validates the
//! description and builds an [`mx_graph::Document`] from it.

pub mod build;
pub mod schema;
pub mod validate;

pub use build::build_document;
pub use schema::*;
pub use validate::{ValidationError, validate_description};

use std::path::Path;

use mx_graph::Document;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Build error: {0}")]
    Build(#[from] mx_core::MxError),

    #[error("Unsupported file extension: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ProjectResult<DocumentDef> {
    let description: DocumentDef = serde_yaml::from_str(content)?;
    validate_description(&description)?;
    Ok(description)
}

pub fn from_json_str(content: &str) -> ProjectResult<DocumentDef> {
    let description: DocumentDef = serde_json::from_str(content)?;
    validate_description(&description)?;
    Ok(description)
}

pub fn load_yaml(path: &Path) -> ProjectResult<DocumentDef> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn load_json(path: &Path) -> ProjectResult<DocumentDef> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

/// Load a description, choosing the format from the file extension.
pub fn load_path(path: &Path) -> ProjectResult<DocumentDef> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => Err(ProjectError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Load a description file and build the document it describes.
pub fn load_document(path: &Path) -> ProjectResult<Document> {
    let description = load_path(path)?;
    build_document(&description)
}
