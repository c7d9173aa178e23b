//! Error types for layout operations.

use thiserror::Error;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors that can occur while laying out answers.
///
/// Well-formed input never fails: blank answers simply produce no lines.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// No answers were supplied.
    #[error("Cannot lay out an empty answer set")]
    NoAnswers,

    /// Question numbers start at 1.
    #[error("Invalid question number: {0} (must be at least 1)")]
    InvalidQuestionNumber(u32),

    /// Unknown page style token.
    #[error("Unknown page style: {0}")]
    UnknownStyle(String),

    /// Layout serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
