//! External system integrations for Dosebook.
//!
//! - [`store`] - the remote table holding drug records
//!
//! # Design Pattern
//!
//! The screen talks to the backend only through the [`store::RemoteStore`]
//! trait, so tests and dry runs swap in [`store::MemoryStore`].
//!
//! ```rust,no_run
//! use dosebook::adapters::store::{PostgrestStore, RemoteStore};
//! use dosebook::config::{secret_string, StoreConfig};
//! use dosebook::domain::PatientKey;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig {
//!     base_url: "https://abc.supabase.co".to_string(),
//!     api_key: Some(secret_string("anon-key".to_string())),
//!     ..Default::default()
//! };
//!
//! let store = PostgrestStore::new(&config)?;
//! let rows = store.query(&PatientKey::new("P1")?).await?;
//! # Ok(())
//! # }
//! ```

pub mod store;
