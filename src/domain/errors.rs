//! Domain error types
//!
//! This module defines the single error hierarchy used by every layer of Strata.
//! Third-party error types are converted into domain variants at the boundary so
//! callers never match on `reqwest` or `serde_yaml` types.

use thiserror::Error;

/// Main Strata error type
#[derive(Debug, Error)]
pub enum StrataError {
    /// No source is registered under the given id
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// A source is already registered under the given id
    #[error("source already registered: {0}")]
    DuplicateSource(String),

    /// The path does not resolve in the tree
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The configured sub-tree path does not resolve in a remote response
    #[error("remote path not found: {0}")]
    RemotePathNotFound(String),

    /// A value exists at the path but has the wrong shape
    #[error("conversion error at '{path}': expected {expected}")]
    Conversion {
        /// Path that was resolved
        path: String,
        /// Name of the requested type
        expected: &'static str,
    },

    /// A required field is missing from a declarative source description
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field of a declarative source description is present but invalid
    #[error("invalid field '{field}': {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// No decoder strategy accepts the format
    #[error("invalid decoder format: {0}")]
    InvalidDecoderFormat(String),

    /// No source strategy accepts the type
    #[error("invalid source type: {0}")]
    InvalidSourceType(String),

    /// Raw content could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// The decoder was used after `close()`
    #[error("decoder already closed")]
    DecoderClosed,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// HTTP errors from remote sources
    #[error("HTTP error: {0}")]
    Http(String),

    /// Timestamp parsing errors
    #[error("invalid timestamp at '{path}': {reason}")]
    Timestamp {
        /// Path holding the timestamp
        path: String,
        /// Parser message
        reason: String,
    },

    /// Settings errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Periodic reload trigger errors
    #[error("trigger error: {0}")]
    Trigger(String),

    /// Several independent failures, e.g. while closing every source
    #[error("{} errors occurred: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<StrataError>),
}

fn join_errors(errors: &[StrataError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl StrataError {
    /// Collapse a list of errors into a single result.
    ///
    /// An empty list is success, one error is returned as is and anything
    /// more becomes [`StrataError::Multiple`].
    pub fn from_many(mut errors: Vec<StrataError>) -> Result<(), StrataError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(StrataError::Multiple(errors)),
        }
    }

    /// Whether the error means "nothing at this path"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StrataError::PathNotFound(_)
                | StrataError::RemotePathNotFound(_)
                | StrataError::SourceNotFound(_)
        )
    }
}

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        StrataError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        StrataError::Decode(format!("JSON: {err}"))
    }
}

impl From<serde_yaml::Error> for StrataError {
    fn from(err: serde_yaml::Error) -> Self {
        StrataError::Decode(format!("YAML: {err}"))
    }
}

impl From<toml::de::Error> for StrataError {
    fn from(err: toml::de::Error) -> Self {
        StrataError::Decode(format!("TOML: {err}"))
    }
}

impl From<reqwest::Error> for StrataError {
    fn from(err: reqwest::Error) -> Self {
        StrataError::Http(err.to_string())
    }
}

impl From<walkdir::Error> for StrataError {
    fn from(err: walkdir::Error) -> Self {
        StrataError::Io(err.to_string())
    }
}
