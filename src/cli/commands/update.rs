//! Update command implementation

use super::{load_patient, open_screen, print_notifications, print_row};
use crate::config::DosebookConfig;
use crate::domain::context::ResultExt;
use crate::domain::{PatientKey, RecordId, RowKey};
use crate::screen::{ActionOutcome, SaveOutcome, ToolbarAction};
use clap::Args;

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Patient key
    #[arg(long)]
    pub patient: PatientKey,

    /// Id of the record to edit
    #[arg(long)]
    pub id: RecordId,

    /// New drug name
    #[arg(long)]
    pub name: Option<String>,

    /// New dose; an empty value clears it
    #[arg(long)]
    pub dose: Option<String>,

    /// New date or timestamp
    #[arg(long)]
    pub time: Option<String>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Use an in-memory store; nothing is sent to the backend
    #[arg(long)]
    pub dry_run: bool,
}

impl UpdateArgs {
    /// Execute the update command
    pub async fn execute(&self, mut config: DosebookConfig) -> anyhow::Result<i32> {
        tracing::info!(patient = %self.patient, id = self.id.get(), "Updating medication record");

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let mut screen = open_screen(&config)?;
        if !load_patient(&mut screen, &self.patient).await {
            return Ok(3); // Operation failure exit code
        }

        let key = RowKey::Persisted(self.id);
        if !screen.row_selected(key) {
            println!("❌ Record {} not found for patient {}", self.id, self.patient);
            return Ok(3); // Operation failure exit code
        }

        let edited = screen.edit_form(|form| -> crate::domain::Result<()> {
            if let Some(name) = &self.name {
                form.set_name(name.clone());
            }
            if let Some(dose) = &self.dose {
                form.set_dose_text(dose).context("--dose")?;
            }
            if let Some(time) = &self.time {
                form.set_time(time.clone());
            }
            if let Some(notes) = &self.notes {
                form.set_notes(notes.clone());
            }
            Ok(())
        });
        if let Some(Err(e)) = edited {
            println!("❌ {e}");
            return Ok(3); // Operation failure exit code
        }

        let outcome = screen.dispatch(ToolbarAction::Save).await;
        print_notifications(&mut screen);

        match outcome {
            ActionOutcome::Save(SaveOutcome::Updated(id)) => {
                print_row(&screen, RowKey::Persisted(id));
                Ok(0)
            }
            other => {
                tracing::warn!(?other, "Record not saved");
                Ok(3) // Operation failure exit code
            }
        }
    }
}
