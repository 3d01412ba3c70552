//! Configuration schema types
//!
//! This module defines the configuration structure for Dosebook.

use crate::config::SecretString;
use crate::domain::record::DRUG_SUGGESTIONS;
use serde::{Deserialize, Serialize};

/// Remote store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgREST-compatible REST endpoint (Supabase)
    #[default]
    Postgrest,
    /// In-process store; nothing leaves the process
    Memory,
}

/// Main Dosebook configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DosebookConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote store configuration
    pub store: StoreConfig,

    /// Screen presentation settings
    #[serde(default)]
    pub screen: ScreenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DosebookConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.store.validate()?;
        self.screen.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode: use the in-memory store regardless of `store.backend`
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Remote store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to talk to
    #[serde(default)]
    pub backend: StoreBackend,

    /// Project URL, e.g. `https://abc.supabase.co`
    #[serde(default)]
    pub base_url: String,

    /// REST path prefix appended to `base_url`
    #[serde(default = "default_rest_path")]
    pub rest_path: String,

    /// API key sent as `apikey` and bearer token (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Table holding drug records
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// TLS certificate verification enabled
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        if self.collection.trim().is_empty() {
            return Err("store.collection cannot be empty".to_string());
        }

        if self.backend == StoreBackend::Memory {
            return Ok(());
        }

        if self.base_url.is_empty() {
            return Err("store.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("store.base_url must start with http:// or https://".to_string());
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| format!("store.base_url is not a valid URL: {e}"))?;

        if !self.rest_path.starts_with('/') {
            return Err("store.rest_path must start with '/'".to_string());
        }

        if self.timeout_seconds == Some(0) {
            return Err("store.timeout_seconds must be > 0 when set".to_string());
        }

        Ok(())
    }

    /// Full URL of the configured collection
    pub fn collection_url(&self) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            self.rest_path.trim_end_matches('/'),
            self.collection
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            base_url: "http://localhost:54321".to_string(),
            rest_path: default_rest_path(),
            api_key: None,
            collection: default_collection(),
            timeout_seconds: None,
            tls_verify: true,
        }
    }
}

/// Screen presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Names offered by the drug name picker
    #[serde(default = "default_drug_suggestions")]
    pub drug_suggestions: Vec<String>,

    /// Width available to the grid, in character cells
    #[serde(default = "default_viewport_width")]
    pub viewport_width: usize,

    /// Width a column gets before any sizing action, in character cells
    #[serde(default = "default_column_width")]
    pub default_column_width: usize,
}

impl ScreenConfig {
    fn validate(&self) -> Result<(), String> {
        if self.viewport_width < 20 {
            return Err(format!(
                "screen.viewport_width must be >= 20, got {}",
                self.viewport_width
            ));
        }

        if self.default_column_width == 0 {
            return Err("screen.default_column_width must be > 0".to_string());
        }

        if self.drug_suggestions.iter().any(|s| s.trim().is_empty()) {
            return Err("screen.drug_suggestions cannot contain empty names".to_string());
        }

        Ok(())
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            drug_suggestions: default_drug_suggestions(),
            viewport_width: default_viewport_width(),
            default_column_width: default_column_width(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_rest_path() -> String {
    "/rest/v1".to_string()
}

fn default_collection() -> String {
    "drugs".to_string()
}

fn default_true() -> bool {
    true
}

fn default_drug_suggestions() -> Vec<String> {
    DRUG_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_viewport_width() -> usize {
    120
}

fn default_column_width() -> usize {
    16
}

fn default_local_path() -> String {
    "/var/log/dosebook".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
