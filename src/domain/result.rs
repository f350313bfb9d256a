//! Result type alias for Strata

use super::errors::StrataError;

/// Result type alias for Strata operations
///
/// # Examples
///
/// ```
/// use strata::domain::result::Result;
/// use strata::domain::errors::StrataError;
///
/// fn lookup_port() -> Result<i64> {
///     Err(StrataError::PathNotFound("server.port".to_string()))
/// }
///
/// assert!(lookup_port().is_err());
/// ```
pub type Result<T> = std::result::Result<T, StrataError>;
