//! Remote store for drug records
//!
//! - [`RemoteStore`] - the query/insert/update contract
//! - [`PostgrestStore`] - PostgREST / Supabase REST binding
//! - [`MemoryStore`] - in-process store for dry runs and tests
//! - [`create_store`] - picks one from configuration

pub mod factory;
pub mod memory;
pub mod postgrest;
pub mod traits;

pub use factory::create_store;
pub use memory::{CallLog, MemoryStore};
#[cfg(test)]
pub use memory::Scripted;
pub use postgrest::PostgrestStore;
pub use traits::{RemoteStore, StoreResult};
