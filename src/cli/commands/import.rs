//! Import command implementation
//!
//! Reads a JSON array of import rows, fills the "add many" modal with them and
//! confirms it. The rows go to the backend as one batch.

use super::{load_patient, open_screen, print_notifications};
use crate::config::DosebookConfig;
use crate::domain::context::ResultExt;
use crate::domain::{PatientKey, Result};
use crate::screen::{ImportRow, SaveOutcome, ToolbarAction};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Patient key
    #[arg(long)]
    pub patient: PatientKey,

    /// JSON file holding an array of rows
    #[arg(long)]
    pub file: PathBuf,

    /// Use an in-memory store; nothing is sent to the backend
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Execute the import command
    pub async fn execute(&self, mut config: DosebookConfig) -> anyhow::Result<i32> {
        tracing::info!(
            patient = %self.patient,
            file = %self.file.display(),
            "Importing medication records"
        );

        let rows = match read_rows(&self.file) {
            Ok(rows) => rows,
            Err(e) => {
                println!("❌ Failed to read import file: {}", self.file.display());
                println!("   Error: {e}");
                return Ok(3); // Operation failure exit code
            }
        };
        if rows.is_empty() {
            println!("Nothing to import");
            return Ok(0);
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let mut screen = open_screen(&config)?;
        if !load_patient(&mut screen, &self.patient).await {
            return Ok(3); // Operation failure exit code
        }

        screen.dispatch(ToolbarAction::AddMany).await;
        screen.import_mut().extend(rows);
        let outcome = screen.confirm_import().await;
        print_notifications(&mut screen);

        match outcome {
            SaveOutcome::Imported(count) => {
                println!("Imported {count} record(s) for patient {}", self.patient);
                Ok(0)
            }
            other => {
                tracing::warn!(?other, "Import not applied");
                Ok(3) // Operation failure exit code
            }
        }
    }
}

fn read_rows(path: &Path) -> Result<Vec<ImportRow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).context("Import file must be a JSON array of rows")
}
