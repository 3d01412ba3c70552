//! CLI interface and argument parsing
//!
//! Drives the medication screen against the configured backend, one intent
//! per invocation.

pub mod commands;

use clap::{Parser, Subcommand};

/// Dosebook - patient medication records
#[derive(Parser, Debug)]
#[command(name = "dosebook")]
#[command(version, about, long_about = None)]
#[command(author = "Dosebook Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "dosebook.toml", env = "DOSEBOOK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DOSEBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a patient's medication records
    List(commands::list::ListArgs),

    /// Add one medication record
    Add(commands::add::AddArgs),

    /// Edit an existing medication record
    Update(commands::update::UpdateArgs),

    /// Add many records from a JSON file
    Import(commands::import::ImportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
