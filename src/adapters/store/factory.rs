//! Store factory
//!
//! Creates the configured [`RemoteStore`] implementation.

use super::memory::MemoryStore;
use super::postgrest::PostgrestStore;
use super::traits::RemoteStore;
use crate::config::schema::{DosebookConfig, StoreBackend};
use crate::domain::Result;
use std::sync::Arc;

/// Create a remote store based on the configuration
///
/// Dry-run mode always yields an in-memory store so no request reaches the
/// backend.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn create_store(config: &DosebookConfig) -> Result<Arc<dyn RemoteStore>> {
    if config.application.dry_run {
        tracing::info!(
            collection = %config.store.collection,
            "Dry run: using in-memory store"
        );
        return Ok(Arc::new(MemoryStore::new(config.store.collection.clone())));
    }

    match config.store.backend {
        StoreBackend::Postgrest => {
            let store = PostgrestStore::new(&config.store)?;
            tracing::info!(url = %store.collection_url(), "Creating PostgREST store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::info!(collection = %config.store.collection, "Creating in-memory store");
            Ok(Arc::new(MemoryStore::new(config.store.collection.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_dry_run_forces_memory_store() {
        let config = parse_config(
            r#"
[application]
dry_run = true

[store]
base_url = "https://abc.supabase.co"
collection = "meds"
"#,
        )
        .unwrap();

        let store = create_store(&config).unwrap();
        assert_eq!(store.collection(), "meds");
    }

    #[test]
    fn test_postgrest_store_created() {
        let config = parse_config(
            r#"
[store]
base_url = "https://abc.supabase.co"
"#,
        )
        .unwrap();

        let store = create_store(&config).unwrap();
        assert_eq!(store.collection(), "drugs");
    }
}
