//! Configuration management for Dosebook.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `DOSEBOOK_*`
//! environment overrides, defaults for optional settings and validation on
//! load.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`StoreConfig`] - backend selection, URL, API key, collection name
//! - [`ScreenConfig`] - drug name suggestions, grid widths
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [store]
//! backend = "postgrest"
//! base_url = "https://abc.supabase.co"
//! api_key = "${DOSEBOOK_API_KEY}"
//! collection = "drugs"
//!
//! [screen]
//! drug_suggestions = ["Prednisolon", "L-Asparginase", "Insulin"]
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, DosebookConfig, LoggingConfig, ScreenConfig, StoreBackend, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
