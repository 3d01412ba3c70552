//! Error context extension trait
//!
//! `.context()` / `.with_context()` for library results, in the spirit of
//! `anyhow::Context` but keeping [`DosebookError`] as the error type.
//!
//! ```rust
//! use dosebook::domain::Result;
//! use dosebook::domain::context::ResultExt;
//!
//! fn read_rows(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::DosebookError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context computed only when there is an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DosebookError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// Validation errors keep their variant; everything else becomes `Other`.
fn wrap(error: DosebookError, context: impl std::fmt::Display) -> DosebookError {
    match error {
        DosebookError::Validation(msg) => DosebookError::Validation(format!("{context}: {msg}")),
        other => DosebookError::Other(format!("{context}: {other}")),
    }
}
