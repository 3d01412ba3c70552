//! Logging and observability
//!
//! Structured logging through `tracing`, plus a few macros used wherever the
//! screen reports the outcome of a remote call.
//!
//! # Example
//!
//! ```no_run
//! use dosebook::logging::init_logging;
//! use dosebook::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(patient = "P1", "Patient selected");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a failed remote store call
///
/// # Example
///
/// ```no_run
/// use dosebook::log_store_failure;
/// use dosebook::domain::StoreError;
///
/// let error = StoreError::ConnectionFailed("refused".to_string());
/// log_store_failure!("query", &error);
/// ```
#[macro_export]
macro_rules! log_store_failure {
    ($operation:expr, $error:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "Remote store call failed"
        );
    };
}

/// Log a response dropped because a newer load superseded it
///
/// # Example
///
/// ```no_run
/// use dosebook::log_stale_response;
///
/// log_stale_response!("query", 3, 4);
/// ```
#[macro_export]
macro_rules! log_stale_response {
    ($operation:expr, $ticket_generation:expr, $current_generation:expr) => {
        tracing::debug!(
            operation = $operation,
            ticket_generation = $ticket_generation,
            current_generation = $current_generation,
            "Discarding stale response"
        );
    };
}

/// Log an intent ignored because its precondition did not hold
///
/// # Example
///
/// ```no_run
/// use dosebook::log_precondition_skip;
///
/// log_precondition_skip!("add", "no patient selected");
/// ```
#[macro_export]
macro_rules! log_precondition_skip {
    ($intent:expr, $reason:expr) => {
        tracing::debug!(intent = $intent, reason = $reason, "Intent ignored");
    };
}
