//! Settings for Strata.
//!
//! Every tunable of the runtime lives in one [`Settings`] value constructed at
//! start-up and passed to the [`Manager`](crate::manager::Manager), the
//! factories and the [`Loader`](crate::manager::Loader). Nothing is read from
//! process-wide mutable state after that.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use strata::config::{load_settings, Settings};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // From a TOML file
//! let settings = load_settings("strata.toml")?;
//!
//! // Or from defaults plus STRATA_* overrides
//! let settings = Settings::from_env()?;
//! println!("separator: {}", settings.path_separator);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Settings File
//!
//! ```toml
//! default_file_format = "yaml"
//! default_remote_format = "json"
//! path_separator = "."
//! observe_frequency_secs = 30
//!
//! [loader]
//! source_path = "config/config.yaml"
//! config_path = "configs"
//!
//! [logging]
//! log_level = "info"
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders in the file are substituted before parsing, and
//! `STRATA_*` variables (`STRATA_PATH_SEPARATOR`, `STRATA_OBSERVE_FREQUENCY`,
//! `STRATA_LOADER_SOURCE_PATH`, ...) override individual fields afterwards.

pub mod loader;
pub mod schema;

pub use loader::load_settings;
pub use schema::{LoaderSettings, LoggingConfig, Settings};
