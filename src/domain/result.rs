//! Result type alias for Dredge

use super::errors::DredgeError;

/// Result type alias for Dredge operations
///
/// # Examples
///
/// ```
/// use dredge::domain::result::Result;
/// use dredge::domain::errors::DredgeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DredgeError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DredgeError>;
