//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "dosebook.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Dosebook configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set store.base_url to your project URL");
                println!("  2. Put DOSEBOOK_API_KEY in your environment or a .env file");
                println!("  3. Validate configuration: dosebook validate-config");
                println!("  4. List records: dosebook list --patient <KEY>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }
}

/// Sample configuration written by `init`
pub fn sample_config() -> &'static str {
    r#"# Dosebook Configuration File

[application]
log_level = "info"
dry_run = false

[store]
backend = "postgrest"  # postgrest | memory
base_url = "https://your-project.supabase.co"
rest_path = "/rest/v1"
api_key = "${DOSEBOOK_API_KEY}"
collection = "drugs"
# timeout_seconds = 30
tls_verify = true

[screen]
drug_suggestions = ["Prednisolon", "L-Asparginase", "Insulin"]
viewport_width = 120
default_column_width = 16

[logging]
local_enabled = false
local_path = "/var/log/dosebook"
local_rotation = "daily"  # daily | hourly | never
"#
}
