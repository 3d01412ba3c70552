//! Integration tests for logging functionality

use dosebook::config::LoggingConfig;
use dosebook::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

// Only one test in this binary may install the global subscriber.
#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(patient = "P1", "Patient selected");
    drop(guard);

    assert!(log_path.is_dir());
    assert!(log_path.join("dosebook.log").exists());

    // A second subscriber cannot be installed
    assert!(init_logging("info", &LoggingConfig::default()).is_err());
}
