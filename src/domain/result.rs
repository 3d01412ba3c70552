//! Result type alias for Dosebook

use super::errors::DosebookError;

/// Result type alias for Dosebook operations
///
/// # Examples
///
/// ```
/// use dosebook::domain::result::Result;
/// use dosebook::domain::errors::DosebookError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DosebookError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DosebookError>;
