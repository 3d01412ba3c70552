// Dosebook - Patient medication records
// Copyright (c) 2025 Dosebook Contributors
// Licensed under the MIT License

use dosebook::cli::{Cli, Commands};
use dosebook::config::{load_config, DosebookConfig, LoggingConfig};
use dosebook::domain::DosebookError;
use dosebook::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let loaded = load_config(&cli.config);

    // Logging follows the configuration when it loaded; console only otherwise
    let (log_level, logging_config) = match &loaded {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig::default(),
        ),
    };
    let _guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Dosebook - patient medication records"
    );

    let exit_code = match execute_command(&cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    loaded: Result<DosebookConfig, DosebookError>,
) -> anyhow::Result<i32> {
    if let Commands::ValidateConfig(args) = &cli.command {
        return args.execute(&cli.config, loaded).await;
    }
    if let Commands::Init(args) = &cli.command {
        return args.execute().await;
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            println!("❌ Failed to load configuration file");
            println!("   Error: {e}");
            return Ok(2); // Configuration error exit code
        }
    };

    match &cli.command {
        Commands::List(args) => args.execute(config).await,
        Commands::Add(args) => args.execute(config).await,
        Commands::Update(args) => args.execute(config).await,
        Commands::Import(args) => args.execute(config).await,
        Commands::ValidateConfig(_) | Commands::Init(_) => Ok(0),
    }
}
