//! CLI command implementations
//!
//! Each command builds a [`DrugsScreen`] over the configured store and plays
//! the same intents a user would: select the patient, pick or add a row,
//! edit the form, press a toolbar button.

pub mod add;
pub mod import;
pub mod init;
pub mod list;
pub mod update;
pub mod validate;

use crate::adapters::store::create_store;
use crate::config::DosebookConfig;
use crate::domain::{PatientKey, Result, RowKey};
use crate::screen::{DrugsScreen, LoadOutcome, Severity};

/// Screen wired to the configured store
pub(crate) fn open_screen(config: &DosebookConfig) -> Result<DrugsScreen> {
    let store = create_store(config)?;
    Ok(DrugsScreen::new(store, &config.screen))
}

/// Select `patient` and load its rows
///
/// Returns `false`, after printing the notification, when the load failed.
pub(crate) async fn load_patient(screen: &mut DrugsScreen, patient: &PatientKey) -> bool {
    match screen.load_patient(Some(patient.clone())).await {
        LoadOutcome::Loaded(rows) => {
            tracing::debug!(patient = %patient, rows, "Patient loaded");
            true
        }
        outcome => {
            tracing::debug!(patient = %patient, ?outcome, "Patient not loaded");
            print_notifications(screen);
            false
        }
    }
}

/// Print and clear the screen's notifications
pub(crate) fn print_notifications(screen: &mut DrugsScreen) {
    for notification in screen.notifications_mut().drain() {
        match notification.severity {
            Severity::Loading => {}
            Severity::Success => println!("✅ {}", notification.message),
            Severity::Warning => println!("⚠️  {}", notification.message),
            Severity::Error => {
                println!("❌ Request failed");
                println!("   Error: {}", notification.message);
            }
        }
    }
}

/// Print the grid, sized to its content
pub(crate) fn print_grid(screen: &DrugsScreen) {
    let mut columns = screen.columns().clone();
    columns.auto_size(screen.rows());
    println!("{}", columns.render_header());
    for row in screen.rows() {
        println!("{}", columns.render_row(row));
    }
}

/// Print one row of the grid
pub(crate) fn print_row(screen: &DrugsScreen, key: RowKey) {
    if let Some(row) = screen.cache().get(key) {
        let mut columns = screen.columns().clone();
        columns.auto_size(std::slice::from_ref(row));
        println!("{}", columns.render_header());
        println!("{}", columns.render_row(row));
    }
}
