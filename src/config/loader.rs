//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DosebookConfig, StoreBackend};
use super::secret::secret_string;
use crate::domain::errors::DosebookError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`DosebookConfig`]
/// 4. Applies environment variable overrides (`DOSEBOOK_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`DosebookError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use dosebook::config::load_config;
///
/// let config = load_config("dosebook.toml").expect("Failed to load config");
/// println!("collection: {}", config.store.collection);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DosebookConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DosebookError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DosebookError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text; the part of [`load_config`] after reading the file
pub fn parse_config(contents: &str) -> Result<DosebookConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: DosebookConfig = toml::from_str(&contents)
        .map_err(|e| DosebookError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        DosebookError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched. All missing variables are reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DosebookError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DosebookError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `DOSEBOOK_*` prefix
///
/// Variables follow the pattern `DOSEBOOK_<SECTION>_<KEY>`, for example
/// `DOSEBOOK_STORE_BASE_URL`.
fn apply_env_overrides(config: &mut DosebookConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("DOSEBOOK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("DOSEBOOK_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Store overrides
    if let Ok(val) = std::env::var("DOSEBOOK_STORE_BACKEND") {
        config.store.backend = match val.to_lowercase().as_str() {
            "postgrest" => StoreBackend::Postgrest,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(DosebookError::Configuration(format!(
                    "Invalid DOSEBOOK_STORE_BACKEND '{other}'. Must be one of: postgrest, memory"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("DOSEBOOK_STORE_BASE_URL") {
        config.store.base_url = val;
    }
    if let Ok(val) = std::env::var("DOSEBOOK_STORE_API_KEY") {
        config.store.api_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("DOSEBOOK_STORE_COLLECTION") {
        config.store.collection = val;
    }
    if let Ok(val) = std::env::var("DOSEBOOK_STORE_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.store.timeout_seconds = Some(secs);
        }
    }
    if let Ok(val) = std::env::var("DOSEBOOK_STORE_TLS_VERIFY") {
        config.store.tls_verify = val.parse().unwrap_or(true);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("DOSEBOOK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("DOSEBOOK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
