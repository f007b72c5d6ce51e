//! Error types for the index.

use fingerhash_minutiae::TemplateError;
use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors returned by context, enrollment and identification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("context is not initialized")]
    NotInitialized,

    #[error("context is already initialized")]
    AlreadyInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("template has too few minutiae")]
    TooFewMinutiae,

    #[error("out of memory")]
    OutOfMemory,

    #[error("value out of range: x={x}, y={y}, t={t}")]
    ValueOutOfRange { x: i64, y: i64, t: i64 },

    #[error("template not found")]
    NotFound,

    #[error("incomplete removal: {removed} of {total} entries removed")]
    IncompleteRemoval { removed: usize, total: usize },

    #[error(transparent)]
    Template(TemplateError),
}

impl From<TemplateError> for IndexError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::NotInitialized => IndexError::NotInitialized,
            other => IndexError::Template(other),
        }
    }
}

impl From<std::collections::TryReserveError> for IndexError {
    fn from(_: std::collections::TryReserveError) -> Self {
        IndexError::OutOfMemory
    }
}
