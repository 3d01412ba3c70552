//! Detail form state
//!
//! A draft copy of the selected row's fields. Edits change only the copy; the
//! grid row is touched again only when a save comes back.

use crate::domain::{
    dose_unit, parse_dose, DosebookError, DrugFields, DrugRecord, GridRow, Result, RowKey,
};

/// Editable copy of one row
#[derive(Debug, Clone, PartialEq)]
pub struct DraftForm {
    /// Row the copy was taken from
    pub source: RowKey,
    /// Current field values
    pub fields: DrugFields,
}

impl DraftForm {
    /// Copy a grid row into a form
    pub fn from_row(row: &GridRow) -> Self {
        Self {
            source: row.key(),
            fields: row.fields().clone(),
        }
    }

    /// Copy a stored record into a form
    pub fn from_record(record: &DrugRecord) -> Self {
        Self {
            source: RowKey::Persisted(record.id),
            fields: record.fields.clone(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.fields.name = name.into();
    }

    pub fn set_dose(&mut self, dose: Option<f64>) {
        self.fields.dose = dose;
    }

    /// Set the dose from text input; empty clears it
    ///
    /// # Errors
    ///
    /// Returns a validation error when the text is not a number.
    pub fn set_dose_text(&mut self, text: &str) -> Result<()> {
        self.fields.dose = parse_dose(text).map_err(DosebookError::Validation)?;
        Ok(())
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.fields.time = time.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.fields.notes = notes.into();
    }

    /// Unit hint for the dose input
    pub fn dose_unit(&self) -> Option<&'static str> {
        dose_unit(&self.fields.name)
    }

    /// True when the form no longer matches `row`
    pub fn diverges_from(&self, row: &GridRow) -> bool {
        self.source != row.key() || &self.fields != row.fields()
    }
}

/// Suggestions whose name starts with `typed`, ignoring case
///
/// # Examples
///
/// ```
/// use dosebook::screen::form::suggest;
///
/// let names = vec!["Prednisolon".to_string(), "Insulin".to_string()];
/// assert_eq!(suggest(&names, "ins"), vec!["Insulin"]);
/// ```
pub fn suggest<'a>(suggestions: &'a [String], typed: &str) -> Vec<&'a str> {
    let typed = typed.trim().to_lowercase();
    suggestions
        .iter()
        .filter(|s| s.to_lowercase().starts_with(&typed))
        .map(String::as_str)
        .collect()
}
