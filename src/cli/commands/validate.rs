//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Dosebook configuration file.

use crate::config::{DosebookConfig, StoreBackend};
use crate::domain::DosebookError;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `loaded` is the result of loading `config_path`; loading already ran
    /// validation, so this only reports.
    pub async fn execute(
        &self,
        config_path: &str,
        loaded: Result<DosebookConfig, DosebookError>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match loaded {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        match config.store.backend {
            StoreBackend::Postgrest => {
                println!("  Store: PostgREST");
                println!("  Collection URL: {}", config.store.collection_url());
                println!(
                    "  API Key: {}",
                    if config.store.api_key.is_some() { "set" } else { "not set" }
                );
                match config.store.timeout_seconds {
                    Some(secs) => println!("  Timeout: {secs}s"),
                    None => println!("  Timeout: none"),
                }
            }
            StoreBackend::Memory => {
                println!("  Store: in-memory");
                println!("  Collection: {}", config.store.collection);
            }
        }
        println!("  Drug Suggestions: {:?}", config.screen.drug_suggestions);
        println!("  Viewport Width: {}", config.screen.viewport_width);
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[tokio::test]
    async fn test_valid_config_exits_zero() {
        let config = parse_config("[store]\nbackend = \"memory\"\n").unwrap();
        let code = ValidateArgs {}
            .execute("dosebook.toml", Ok(config))
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_exits_two() {
        let loaded = Err(DosebookError::Configuration("bad".to_string()));
        let code = ValidateArgs {}
            .execute("dosebook.toml", loaded)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
