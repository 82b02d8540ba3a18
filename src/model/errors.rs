use thiserror::Error;

use crate::mat::MatError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("MAT-file error: {0}")]
    Mat(#[from] MatError),
    #[error("Variable not found: {0}")]
    MissingVariable(String),
    #[error("Expected a 1x1 struct at '{path}', found {found}")]
    Nesting { path: String, found: String },
    #[error("Field '{field}' not found in '{path}'")]
    FieldNotFound { path: String, field: String },
    #[error("Cannot convert {what} to float32: {reason}")]
    Cast { what: String, reason: String },
    #[error("Shape mismatch: {0}")]
    Shape(String),
}

impl ModelError {
    pub fn cast(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Cast {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
