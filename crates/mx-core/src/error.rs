use thiserror::Error;

use crate::ids::ElementId;

pub type MxResult<T> = Result<T, MxError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MxError {
    #[error("Unknown element: {id}")]
    UnknownElement { id: ElementId },

    #[error("Element '{parent}' already has a child named '{name}'")]
    DuplicateName { parent: String, name: String },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
