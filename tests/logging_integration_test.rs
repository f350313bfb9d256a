//! Integration tests for logging initialization
//!
//! The global subscriber can only be installed once per process, so this
//! binary holds a single test that installs it.

use strata::config::LoggingConfig;
use strata::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_file_logging_creates_directory_and_rejects_second_init() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        log_level: "debug".to_string(),
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());
    tracing::info!(source_id = "test", "Source added");

    assert!(init_logging("info", &LoggingConfig::default()).is_err());
    drop(guard);
}
