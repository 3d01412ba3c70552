//! Example driving the medication screen against an in-memory store
//!
//! This example shows how to:
//! - Initialize structured logging
//! - Select a patient through the shared session
//! - Add, edit and save a row, then bulk-import two more
//!
//! Run with:
//! ```bash
//! cargo run --example screen_session
//! ```

use dosebook::adapters::store::MemoryStore;
use dosebook::config::{LoggingConfig, ScreenConfig};
use dosebook::domain::{DrugFields, DrugRecord, PatientKey, RecordId};
use dosebook::logging::init_logging;
use dosebook::screen::{DrugsScreen, PatientSummary, SessionContext, ToolbarAction};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = init_logging("debug", &LoggingConfig::default())?;

    let patient = PatientKey::new("P1")?;
    let store = MemoryStore::new("drugs").with_records(vec![DrugRecord::new(
        RecordId::new(1)?,
        patient.clone(),
        DrugFields::named("Insulin").with_dose(4.0).with_time("2024-01-01"),
    )]);

    let session = SessionContext::new();
    session.publish_patients(vec![PatientSummary {
        key: patient.clone(),
        label: "Demo patient".to_string(),
    }]);

    let mut screen = DrugsScreen::new(Arc::new(store), &ScreenConfig::default());

    // The session already holds a selection, so follow() loads it and then
    // returns once the session goes away.
    session.select_patient(Some(patient));
    let receiver = session.subscribe();
    drop(session);
    screen.follow(receiver).await;

    screen.dispatch(ToolbarAction::Add).await;
    screen.edit_form(|form| {
        form.set_name("Prednisolon");
        form.set_dose(Some(40.0));
        form.set_time("2024-01-02");
    });
    screen.dispatch(ToolbarAction::Save).await;

    screen.dispatch(ToolbarAction::AddMany).await;
    for day in ["2024-01-03", "2024-01-04"] {
        screen
            .import_mut()
            .push(DrugFields::named("L-Asparginase").with_dose(2500.0).with_time(day));
    }
    screen.confirm_import().await;

    screen.dispatch(ToolbarAction::AutoSizeColumns).await;
    println!("{}", screen.columns().render_header());
    for row in screen.rows() {
        println!("{}", screen.columns().render_row(row));
    }

    for note in screen.notifications().items() {
        println!("[{}] {}", note.severity, note.message);
    }

    Ok(())
}
