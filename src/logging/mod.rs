//! Logging
//!
//! Structured logging built on `tracing`: a console layer, plus an optional
//! JSON file layer with rotation.
//!
//! # Example
//!
//! ```no_run
//! use strata::config::LoggingConfig;
//! use strata::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(source_id = "defaults", "Source added");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use strata::log_error_with_context;
/// use strata::domain::StrataError;
///
/// let error = StrataError::SourceNotFound("overrides".to_string());
/// log_error_with_context!(&error, "Failed to remove source");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
