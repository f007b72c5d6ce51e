use thiserror::Error;

/// Errors returned while building or accessing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("template is not initialized")]
    NotInitialized,

    #[error("parse error at line {line}: {reason}")]
    Parser { line: usize, reason: String },

    #[error("too few minutiae: need at least {need}, got {got}")]
    TooFewMinutiae { got: usize, need: usize },

    #[error("minutiae extractor error: {0}")]
    MinutiaeExtractor(String),
}
