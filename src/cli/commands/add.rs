//! Add command implementation
//!
//! Adds a draft row, fills its form and saves it, the way the toolbar's add
//! and save buttons do.

use super::{load_patient, open_screen, print_notifications, print_row};
use crate::config::DosebookConfig;
use crate::domain::{PatientKey, RowKey};
use crate::screen::{ActionOutcome, SaveOutcome, ToolbarAction};
use clap::Args;

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Patient key
    #[arg(long)]
    pub patient: PatientKey,

    /// Drug name
    #[arg(long)]
    pub name: String,

    /// Dose amount
    #[arg(long)]
    pub dose: Option<f64>,

    /// Date or timestamp of administration
    #[arg(long)]
    pub time: Option<String>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Use an in-memory store; nothing is sent to the backend
    #[arg(long)]
    pub dry_run: bool,
}

impl AddArgs {
    /// Execute the add command
    pub async fn execute(&self, mut config: DosebookConfig) -> anyhow::Result<i32> {
        tracing::info!(patient = %self.patient, name = %self.name, "Adding medication record");

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let mut screen = open_screen(&config)?;
        if !load_patient(&mut screen, &self.patient).await {
            return Ok(3); // Operation failure exit code
        }

        screen.dispatch(ToolbarAction::Add).await;
        screen.edit_form(|form| {
            form.set_name(self.name.clone());
            form.set_dose(self.dose);
            if let Some(time) = &self.time {
                form.set_time(time.clone());
            }
            if let Some(notes) = &self.notes {
                form.set_notes(notes.clone());
            }
        });

        let outcome = screen.dispatch(ToolbarAction::Save).await;
        print_notifications(&mut screen);

        match outcome {
            ActionOutcome::Save(SaveOutcome::Inserted(id)) => {
                print_row(&screen, RowKey::Persisted(id));
                if let Some(unit) = screen.form().and_then(|f| f.dose_unit()) {
                    println!("Dose unit: {unit}");
                }
                Ok(0)
            }
            other => {
                tracing::warn!(?other, "Record not added");
                Ok(3) // Operation failure exit code
            }
        }
    }
}
