//! List command implementation
//!
//! Loads one patient's medication records and prints them as the grid shows
//! them, or as JSON.

use super::{load_patient, open_screen, print_grid};
use crate::config::DosebookConfig;
use crate::domain::PatientKey;
use clap::Args;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Patient key
    #[arg(long)]
    pub patient: PatientKey,

    /// Print records as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, config: DosebookConfig) -> anyhow::Result<i32> {
        tracing::info!(patient = %self.patient, "Listing medication records");

        let mut screen = open_screen(&config)?;
        if !load_patient(&mut screen, &self.patient).await {
            return Ok(3); // Operation failure exit code
        }

        if self.json {
            let records: Vec<_> = screen
                .rows()
                .iter()
                .filter_map(|row| row.as_record())
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(0);
        }

        if screen.rows().is_empty() {
            println!("No medication records for patient {}", self.patient);
            return Ok(0);
        }

        print_grid(&screen);
        println!();
        println!("{} record(s)", screen.rows().len());
        Ok(0)
    }
}
