//! Error types for model decoding and validation.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised at the model boundary (decoding and strict validation).
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid detection at index {index}: {reason}")]
    InvalidDetection { index: usize, reason: String },

    #[error("Invalid video metadata: {0}")]
    InvalidMetadata(String),
}

impl ModelError {
    /// Create an invalid detection error.
    pub fn invalid_detection(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDetection {
            index,
            reason: reason.into(),
        }
    }

    /// Create an invalid metadata error.
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata(message.into())
    }
}
