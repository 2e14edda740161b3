//! Result type alias for Rill

use super::errors::RillError;

/// Result type alias for Rill operations
///
/// # Examples
///
/// ```
/// use rill::domain::result::Result;
/// use rill::domain::errors::RillError;
///
/// fn failing_function() -> Result<()> {
///     Err(RillError::Parse("Missing permit".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, RillError>;
