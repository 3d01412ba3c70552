//! Domain models and types for Dosebook.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientKey`], [`RecordId`])
//! - **Records and payloads** ([`DrugRecord`], [`NewDrugRecord`], [`DrugPatch`])
//! - **Grid rows** ([`GridRow`], [`RowKey`]) where a draft is a variant, not id `0`
//! - **Error types** ([`DosebookError`], [`StoreError`]) and the [`Result`] alias
//!
//! ```rust
//! use dosebook::domain::{DrugFields, GridRow, RowKey};
//!
//! let draft = GridRow::Draft(DrugFields::named("Insulin"));
//! assert_eq!(draft.key(), RowKey::Draft);
//! assert!(draft.ptkey().is_none());
//! ```

pub mod context;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{DosebookError, StoreError};
pub use ids::{PatientKey, RecordId};
pub use record::{
    dose_unit, parse_dose, DrugFields, DrugPatch, DrugRecord, GridRow, NewDrugRecord, RowKey,
    DRUG_SUGGESTIONS,
};
pub use result::Result;
