//! Dataset loading errors.

use super::error_code::{self, OptKgErrorCode};

/// Errors that can occur while building the response registry.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {path}")]
    FileNotFound { path: String },

    #[error("Dataset is missing column {column}")]
    MissingColumn { column: &'static str },

    #[error("Malformed row {line}: {message}")]
    MalformedRow { line: usize, message: String },

    #[error("Invalid label {value:?} at row {line}")]
    InvalidLabel { line: usize, value: String },

    #[error("Task {task} has conflicting gold labels")]
    ConflictingGold { task: String },

    #[error("Dataset contains no responses")]
    Empty,
}

impl OptKgErrorCode for DatasetError {
    fn error_code(&self) -> &'static str {
        error_code::DATASET_ERROR
    }
}
