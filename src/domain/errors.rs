//! Domain error types
//!
//! This module defines the error hierarchy for Dosebook.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Dosebook error type
///
/// This is the primary error type used throughout the crate.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum DosebookError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl DosebookError {
    /// Returns the store error if this error came from the remote store
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            DosebookError::Store(e) => Some(e),
            _ => None,
        }
    }
}

/// Remote store errors
///
/// Errors that occur when talking to the backend that hosts the drugs table.
/// These errors don't expose the HTTP client's types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the backend
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// The backend answered with an error status
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend answered 2xx but the body was not a row list
    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl StoreError {
    /// True when the backend itself reported the failure, as opposed to
    /// the request never completing.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            StoreError::Backend { .. } | StoreError::InvalidResponse(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DosebookError {
    fn from(err: std::io::Error) -> Self {
        DosebookError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DosebookError {
    fn from(err: serde_json::Error) -> Self {
        DosebookError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DosebookError {
    fn from(err: toml::de::Error) -> Self {
        DosebookError::Configuration(format!("TOML parse error: {err}"))
    }
}
