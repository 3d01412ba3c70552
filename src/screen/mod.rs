//! The medication screen
//!
//! Headless model of the drugs grid: what rows are shown, which one is
//! selected, what the detail form holds and what the toolbar may do.
//!
//! - [`DrugsScreen`] - the controller; owns everything below
//! - [`RowCache`] - rows, selection, flash marks, scroll target
//! - [`DraftForm`] - editable copy of the selected row
//! - [`ScreenState`] - the state machine driven by [`ScreenEvent`]
//! - [`ImportModal`] - collects rows for a bulk insert
//! - [`SessionContext`] - patient list and selection shared across screens
//!
//! ```rust
//! use dosebook::adapters::store::MemoryStore;
//! use dosebook::config::ScreenConfig;
//! use dosebook::domain::PatientKey;
//! use dosebook::screen::{AddOutcome, DrugsScreen};
//! use std::sync::Arc;
//!
//! let mut screen = DrugsScreen::new(Arc::new(MemoryStore::default()), &ScreenConfig::default());
//! let ticket = screen.select_patient(Some(PatientKey::new("P1").unwrap())).unwrap();
//! screen.finish_load(ticket, Ok(Vec::new()));
//! assert_eq!(screen.add_draft(), AddOutcome::Created);
//! ```

pub mod cache;
pub mod columns;
pub mod controller;
pub mod form;
pub mod import;
pub mod notify;
pub mod session;
pub mod state;
pub mod toolbar;

pub use cache::RowCache;
pub use columns::{ColumnDef, ColumnLayout, Field};
pub use controller::{
    ActionOutcome, AddOutcome, DrugsScreen, LoadOutcome, LoadTicket, SaveCall, SaveOutcome,
    SaveRequest, WriteKind, WriteTicket,
};
pub use form::DraftForm;
pub use import::{ImportModal, ImportRow};
pub use notify::{Notification, Notifications, Severity};
pub use session::{PatientSummary, SessionContext};
pub use state::{ScreenEvent, ScreenState};
pub use toolbar::ToolbarAction;
