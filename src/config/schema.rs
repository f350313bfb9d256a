//! Settings schema types
//!
//! These structs are the explicit, passed-in replacement for process-wide
//! tunables: decode format defaults, the path separator, reload frequency,
//! the bootstrap loader and logging. Construct them once at start-up and hand
//! them to the manager, factories and loader.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root settings structure, mapped from an optional TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Decode format used by file and directory sources without `format`
    #[serde(default = "default_file_format")]
    pub default_file_format: String,

    /// Decode format used by remote sources without `format`
    #[serde(default = "default_remote_format")]
    pub default_remote_format: String,

    /// Separator between path segments
    #[serde(default = "default_path_separator")]
    pub path_separator: String,

    /// Seconds between reload polls of observable sources (0 disables)
    #[serde(default)]
    pub observe_frequency_secs: u64,

    /// Request timeout for remote sources
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,

    /// Bootstrap loader settings
    #[serde(default)]
    pub loader: LoaderSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_file_format: default_file_format(),
            default_remote_format: default_remote_format(),
            path_separator: default_path_separator(),
            observe_frequency_secs: 0,
            remote_timeout_secs: default_remote_timeout_secs(),
            loader: LoaderSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Validates the settings
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        if self.default_file_format.trim().is_empty() {
            return Err("default_file_format cannot be empty".to_string());
        }
        if self.default_remote_format.trim().is_empty() {
            return Err("default_remote_format cannot be empty".to_string());
        }
        if self.path_separator.is_empty() {
            return Err("path_separator cannot be empty".to_string());
        }
        if self.remote_timeout_secs == 0 {
            return Err("remote_timeout_secs must be greater than 0".to_string());
        }
        self.loader.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Reload period, `None` when periodic reload is disabled
    pub fn observe_frequency(&self) -> Option<Duration> {
        match self.observe_frequency_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Timeout applied to remote source requests
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

/// Bootstrap loader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Whether the loader runs at all
    #[serde(default = "default_true")]
    pub active: bool,

    /// File holding the bootstrap configuration (empty to skip it)
    #[serde(default = "default_loader_source_path")]
    pub source_path: String,

    /// Decode format of the bootstrap file
    #[serde(default = "default_file_format")]
    pub source_format: String,

    /// Path of the source description list inside the configuration
    #[serde(default = "default_loader_config_path")]
    pub config_path: String,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            active: true,
            source_path: default_loader_source_path(),
            source_format: default_file_format(),
            config_path: default_loader_config_path(),
        }
    }
}

impl LoaderSettings {
    fn validate(&self) -> Result<(), String> {
        if self.active && self.config_path.trim().is_empty() {
            return Err("loader.config_path cannot be empty".to_string());
        }
        if !self.source_path.is_empty() && self.source_format.trim().is_empty() {
            return Err("loader.source_format cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("local_path cannot be empty when local_enabled is true".to_string());
        }
        Ok(())
    }
}

fn default_file_format() -> String {
    "yaml".to_string()
}

fn default_remote_format() -> String {
    "json".to_string()
}

fn default_path_separator() -> String {
    ".".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_loader_source_path() -> String {
    "config/config.yaml".to_string()
}

fn default_loader_config_path() -> String {
    "configs".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_file_format, "yaml");
        assert_eq!(settings.default_remote_format, "json");
        assert_eq!(settings.path_separator, ".");
        assert_eq!(settings.observe_frequency(), None);
        assert_eq!(settings.loader.config_path, "configs");
        assert!(settings.loader.active);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_observe_frequency() {
        let settings = Settings {
            observe_frequency_secs: 5,
            ..Default::default()
        };
        assert_eq!(settings.observe_frequency(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_validate_rejects_empty_separator() {
        let settings = Settings {
            path_separator: String::new(),
            ..Default::default()
        };
        assert!(settings.validate().unwrap_err().contains("path_separator"));
    }

    #[test]
    fn test_validate_rejects_bad_log_level() {
        let mut settings = Settings::default();
        settings.logging.log_level = "loud".to_string();
        assert!(settings.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_validate_rejects_bad_rotation() {
        let mut settings = Settings::default();
        settings.logging.local_rotation = "size".to_string();
        assert!(settings.validate().unwrap_err().contains("local_rotation"));
    }

    #[test]
    fn test_validate_rejects_empty_loader_config_path() {
        let mut settings = Settings::default();
        settings.loader.config_path = " ".to_string();
        assert!(settings.validate().is_err());

        settings.loader.active = false;
        assert!(settings.validate().is_ok());
    }
}
