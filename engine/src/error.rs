//! Error types for the optimist engine.

use crate::RecordId;
use thiserror::Error;

/// All possible errors from the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Concurrency errors
    #[error("record {0} has a pending change, try again when it settles")]
    RecordBusy(RecordId),

    // Validation errors
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("field '{field}' must be at least {min} characters")]
    FieldTooShort { field: String, min: usize },

    #[error("field '{field}' is not a valid {expected}")]
    InvalidFormat { field: String, expected: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
