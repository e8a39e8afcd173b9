//! Error types for overlay and analytics operations.
//!
//! Rendering and aggregation never fail: missing surfaces and missing data
//! degrade to no-ops and empty charts. These errors cover the host-facing
//! boundaries only.

use thiserror::Error;
use vdet_models::ModelError;

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors surfaced to the host application.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Invalid playback speed: {0} (must be finite and positive)")]
    InvalidPlaybackSpeed(f64),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("Session has been torn down")]
    SessionClosed,

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl OverlayError {
    /// Create an invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.to_string(),
        }
    }
}
