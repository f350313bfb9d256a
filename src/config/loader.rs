//! Settings loader with TOML parsing and environment variable overrides

use super::schema::Settings;
use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads settings from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into [`Settings`]
/// 4. Applies environment variable overrides (STRATA_* prefix)
/// 5. Validates the settings
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use strata::config::load_settings;
///
/// let settings = load_settings("strata.toml").expect("Failed to load settings");
/// ```
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StrataError::Configuration(format!(
            "Settings file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StrataError::Configuration(format!(
            "Failed to read settings file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut settings: Settings = toml::from_str(&contents)
        .map_err(|e| StrataError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut settings);

    settings
        .validate()
        .map_err(|e| StrataError::Configuration(format!("Settings validation failed: {e}")))?;

    Ok(settings)
}

impl Settings {
    /// Built-in defaults with `STRATA_*` environment overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if the overridden settings fail validation.
    pub fn from_env() -> Result<Self> {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings);
        settings
            .validate()
            .map_err(|e| StrataError::Configuration(format!("Settings validation failed: {e}")))?;
        Ok(settings)
    }
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| StrataError::Configuration(e.to_string()))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(StrataError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the STRATA_* prefix
///
/// Unparseable numeric and boolean values are ignored.
fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("STRATA_DEFAULT_FILE_FORMAT") {
        settings.default_file_format = val;
    }
    if let Ok(val) = std::env::var("STRATA_DEFAULT_REMOTE_FORMAT") {
        settings.default_remote_format = val;
    }
    if let Ok(val) = std::env::var("STRATA_PATH_SEPARATOR") {
        settings.path_separator = val;
    }
    if let Ok(val) = std::env::var("STRATA_OBSERVE_FREQUENCY") {
        if let Ok(secs) = val.parse() {
            settings.observe_frequency_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("STRATA_REMOTE_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            settings.remote_timeout_secs = secs;
        }
    }

    // Loader overrides
    if let Ok(val) = std::env::var("STRATA_LOADER_ACTIVE") {
        if let Ok(active) = val.parse() {
            settings.loader.active = active;
        }
    }
    if let Ok(val) = std::env::var("STRATA_LOADER_SOURCE_PATH") {
        settings.loader.source_path = val;
    }
    if let Ok(val) = std::env::var("STRATA_LOADER_SOURCE_FORMAT") {
        settings.loader.source_format = val;
    }
    if let Ok(val) = std::env::var("STRATA_LOADER_CONFIG_PATH") {
        settings.loader.config_path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("STRATA_LOG_LEVEL") {
        settings.logging.log_level = val;
    }
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_ENABLED") {
        if let Ok(enabled) = val.parse() {
            settings.logging.local_enabled = enabled;
        }
    }
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_PATH") {
        settings.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_ROTATION") {
        settings.logging.local_rotation = val;
    }
}
