//! Remote store abstraction
//!
//! The three calls the medication screen makes against its backing table.

use crate::domain::{DrugPatch, DrugRecord, NewDrugRecord, PatientKey, RecordId, StoreError};
use async_trait::async_trait;

/// Result of a remote store call
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Remote store trait for drug records
///
/// Every call is a single attempt: implementations do not retry. Writes return
/// the rows as stored by the backend; an empty list from a write is a valid
/// response that callers treat as a soft failure.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Name of the collection (table) this store addresses
    fn collection(&self) -> &str;

    /// All records belonging to `ptkey`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    async fn query(&self, ptkey: &PatientKey) -> StoreResult<Vec<DrugRecord>>;

    /// Insert `rows` as one batch and return the created records
    ///
    /// The batch is all-or-nothing as far as the backend provides it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    async fn insert(&self, rows: &[NewDrugRecord]) -> StoreResult<Vec<DrugRecord>>;

    /// Apply `patch` to the record with `id` and return the updated records
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    async fn update(&self, id: RecordId, patch: &DrugPatch) -> StoreResult<Vec<DrugRecord>>;
}
