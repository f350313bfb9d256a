//! Integration tests for settings loading and validation
//!
//! Tests that modify environment variables hold ENV_MUTEX so they do not
//! interfere with each other.

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use strata::config::{load_settings, Settings};
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for var in [
        "STRATA_DEFAULT_FILE_FORMAT",
        "STRATA_PATH_SEPARATOR",
        "STRATA_OBSERVE_FREQUENCY",
        "STRATA_LOADER_ACTIVE",
        "STRATA_LOADER_CONFIG_PATH",
        "STRATA_LOG_LEVEL",
        "TEST_STRATA_BOOTSTRAP",
    ] {
        std::env::remove_var(var);
    }
}

fn settings_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_settings() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = settings_file(
        r#"
default_file_format = "json"
default_remote_format = "yaml"
path_separator = "/"
observe_frequency_secs = 30
remote_timeout_secs = 5

[loader]
active = true
source_path = "/etc/app/bootstrap.json"
source_format = "json"
config_path = "sources"

[logging]
log_level = "debug"
local_enabled = true
local_path = "/var/log/app"
local_rotation = "hourly"
"#,
    );

    let settings = load_settings(file.path()).unwrap();
    assert_eq!(settings.default_file_format, "json");
    assert_eq!(settings.default_remote_format, "yaml");
    assert_eq!(settings.path_separator, "/");
    assert_eq!(settings.observe_frequency(), Some(Duration::from_secs(30)));
    assert_eq!(settings.remote_timeout(), Duration::from_secs(5));
    assert_eq!(settings.loader.source_path, "/etc/app/bootstrap.json");
    assert_eq!(settings.loader.config_path, "sources");
    assert_eq!(settings.logging.log_level, "debug");
    assert_eq!(settings.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_settings_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = settings_file("");
    let settings = load_settings(file.path()).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.observe_frequency(), None);
}

#[test]
fn test_env_overrides_take_precedence() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("STRATA_OBSERVE_FREQUENCY", "10");
    std::env::set_var("STRATA_LOADER_ACTIVE", "false");
    std::env::set_var("STRATA_LOG_LEVEL", "warn");

    let file = settings_file("observe_frequency_secs = 60\n");
    let settings = load_settings(file.path()).unwrap();
    assert_eq!(settings.observe_frequency_secs, 10);
    assert!(!settings.loader.active);
    assert_eq!(settings.logging.log_level, "warn");

    let from_env = Settings::from_env().unwrap();
    assert_eq!(from_env.observe_frequency_secs, 10);

    cleanup_env_vars();
}

#[test]
fn test_variable_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("TEST_STRATA_BOOTSTRAP", "/srv/bootstrap.yaml");
    let file = settings_file("[loader]\nsource_path = \"${TEST_STRATA_BOOTSTRAP}\"\n");
    let settings = load_settings(file.path()).unwrap();
    assert_eq!(settings.loader.source_path, "/srv/bootstrap.yaml");

    cleanup_env_vars();
    let result = load_settings(file.path());
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("TEST_STRATA_BOOTSTRAP"));
}

#[test]
fn test_invalid_settings_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = settings_file("path_separator = \"\"\n");
    assert!(load_settings(file.path()).is_err());

    let file = settings_file("[logging]\nlocal_rotation = \"weekly\"\n");
    assert!(load_settings(file.path()).is_err());

    std::env::set_var("STRATA_PATH_SEPARATOR", "");
    assert!(Settings::from_env().is_err());
    cleanup_env_vars();
}

#[test]
fn test_missing_settings_file() {
    let result = load_settings("/definitely/not/strata.toml");
    assert!(result.is_err());
}
