//! Error types for rustharvest.
//!
//! Only provider-level failures cross the harvest boundary as errors.
//! Malformed individual results are reported through
//! [`crate::extract::ExtractOutcome`] instead.

use thiserror::Error;

/// Main error type for rustharvest operations.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Search provider returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from the provider
        code: u16,
        /// Error message (includes the response body when available)
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `HarvestError`
pub type Result<T> = std::result::Result<T, HarvestError>;
