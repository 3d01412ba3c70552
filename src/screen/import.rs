//! Bulk import modal
//!
//! The modal collects draft rows, each tagged with a local counter (`inc`),
//! and hands them back on confirmation. Before they are sent the rows lose
//! their transient fields and their date gains a midnight time of day.

use crate::domain::{DrugFields, NewDrugRecord, PatientKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time of day attached to imported dates
pub const IMPORT_TIME_OF_DAY: &str = "00:00:00";

/// A row as produced by the modal or an import file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Placeholder id carried by modal rows, never sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Modal-local row counter, never sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inc: Option<u64>,

    #[serde(flatten)]
    pub fields: DrugFields,
}

impl ImportRow {
    pub fn new(fields: DrugFields) -> Self {
        Self {
            id: None,
            inc: None,
            fields,
        }
    }
}

/// Turn a bare `YYYY-MM-DD` date into a midnight timestamp
///
/// Anything that is not a bare date is passed through unchanged so rows
/// already carrying a time are not mangled.
///
/// # Examples
///
/// ```
/// use dosebook::screen::import::normalize_time;
///
/// assert_eq!(normalize_time("2024-01-05"), "2024-01-05 00:00:00");
/// assert_eq!(normalize_time("2024-01-05 08:30:00"), "2024-01-05 08:30:00");
/// ```
pub fn normalize_time(time: &str) -> String {
    let trimmed = time.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => format!("{} {IMPORT_TIME_OF_DAY}", date.format("%Y-%m-%d")),
        Err(_) => time.to_string(),
    }
}

/// Insert payloads for `rows`, scoped to `ptkey`
pub fn into_new_records(rows: Vec<ImportRow>, ptkey: &PatientKey) -> Vec<NewDrugRecord> {
    rows.into_iter()
        .map(|row| {
            let mut fields = row.fields;
            fields.time = normalize_time(&fields.time);
            NewDrugRecord::new(ptkey.clone(), fields)
        })
        .collect()
}

/// State of the "add many" modal
#[derive(Debug, Default, Clone)]
pub struct ImportModal {
    visible: bool,
    rows: Vec<ImportRow>,
    next_inc: u64,
}

impl ImportModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.visible = true;
    }

    /// Close without returning rows; collected rows are kept for the next open
    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Add a row and return its counter
    pub fn push(&mut self, fields: DrugFields) -> u64 {
        self.next_inc += 1;
        let inc = self.next_inc;
        self.rows.push(ImportRow {
            id: Some(0),
            inc: Some(inc),
            fields,
        });
        inc
    }

    /// Add rows read from a file, renumbering them
    pub fn extend(&mut self, rows: impl IntoIterator<Item = ImportRow>) {
        for row in rows {
            self.push(row.fields);
        }
    }

    /// Drop the row with counter `inc`
    pub fn remove(&mut self, inc: u64) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.inc != Some(inc));
        self.rows.len() != before
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    /// Hide the modal and hand over the collected rows
    pub fn confirm(&mut self) -> Vec<ImportRow> {
        self.visible = false;
        std::mem::take(&mut self.rows)
    }
}
