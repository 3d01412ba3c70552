//! Drug record model
//!
//! A row of the `drugs` table and the payloads sent back to it. Rows held by
//! the grid are either a persisted [`DrugRecord`] or the single unsaved draft,
//! distinguished by [`RowKey`] instead of a magic id.

use super::ids::{PatientKey, RecordId};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Drug names offered by the name picker. Free text is accepted as well.
pub const DRUG_SUGGESTIONS: [&str; 3] = ["Prednisolon", "L-Asparginase", "Insulin"];

/// Unit shown next to the dose input for a given drug name
///
/// # Examples
///
/// ```
/// use dosebook::domain::record::dose_unit;
///
/// assert_eq!(dose_unit("Prednisolon"), Some("mg/m²"));
/// assert_eq!(dose_unit("Insulin"), None);
/// ```
pub fn dose_unit(name: &str) -> Option<&'static str> {
    match name {
        "Prednisolon" => Some("mg/m²"),
        "L-Asparginase" => Some("IU/m²"),
        _ => None,
    }
}

/// The editable columns of a drug record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrugFields {
    /// Medication name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Dose amount, nullable
    #[serde(default, deserialize_with = "number_or_text")]
    pub dose: Option<f64>,

    /// Timestamp string as stored by the backend
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,

    /// Free text
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

impl DrugFields {
    /// Creates fields with the given name and everything else empty
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the dose
    pub fn with_dose(mut self, dose: f64) -> Self {
        self.dose = Some(dose);
        self
    }

    /// Sets the time
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// Sets the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Unit for the current name, if it has one
    pub fn dose_unit(&self) -> Option<&'static str> {
        dose_unit(&self.name)
    }
}

/// A persisted drug record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugRecord {
    /// Backend-assigned id
    pub id: RecordId,

    /// Owning patient
    pub ptkey: PatientKey,

    /// Editable columns
    #[serde(flatten)]
    pub fields: DrugFields,
}

impl DrugRecord {
    /// Creates a record
    pub fn new(id: RecordId, ptkey: PatientKey, fields: DrugFields) -> Self {
        Self { id, ptkey, fields }
    }
}

/// Insert payload: a record without an id, scoped to a patient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDrugRecord {
    /// Owning patient
    pub ptkey: PatientKey,

    /// Editable columns
    #[serde(flatten)]
    pub fields: DrugFields,
}

impl NewDrugRecord {
    /// Creates an insert payload
    pub fn new(ptkey: PatientKey, fields: DrugFields) -> Self {
        Self { ptkey, fields }
    }
}

/// Update payload: only the mutable columns, addressed by id elsewhere
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugPatch {
    pub name: String,
    pub dose: Option<f64>,
    pub time: String,
    pub notes: String,
}

impl From<&DrugFields> for DrugPatch {
    fn from(fields: &DrugFields) -> Self {
        Self {
            name: fields.name.clone(),
            dose: fields.dose,
            time: fields.time.clone(),
            notes: fields.notes.clone(),
        }
    }
}

/// Identity of a grid row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// The unsaved draft row
    Draft,
    /// A row backed by a stored record
    Persisted(RecordId),
}

impl RowKey {
    /// Record id, if persisted
    pub fn id(self) -> Option<RecordId> {
        match self {
            RowKey::Draft => None,
            RowKey::Persisted(id) => Some(id),
        }
    }

    /// True for the draft row
    pub fn is_draft(self) -> bool {
        matches!(self, RowKey::Draft)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Draft => write!(f, "draft"),
            RowKey::Persisted(id) => write!(f, "{id}"),
        }
    }
}

/// A row held by the grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridRow {
    /// Unsaved row created by the add action
    Draft(DrugFields),
    /// Row mirrored from the backend
    Persisted(DrugRecord),
}

impl GridRow {
    /// An empty draft row
    pub fn empty_draft() -> Self {
        GridRow::Draft(DrugFields::default())
    }

    pub fn key(&self) -> RowKey {
        match self {
            GridRow::Draft(_) => RowKey::Draft,
            GridRow::Persisted(record) => RowKey::Persisted(record.id),
        }
    }

    pub fn fields(&self) -> &DrugFields {
        match self {
            GridRow::Draft(fields) => fields,
            GridRow::Persisted(record) => &record.fields,
        }
    }

    /// Owning patient; drafts have none until inserted
    pub fn ptkey(&self) -> Option<&PatientKey> {
        match self {
            GridRow::Draft(_) => None,
            GridRow::Persisted(record) => Some(&record.ptkey),
        }
    }

    pub fn as_record(&self) -> Option<&DrugRecord> {
        match self {
            GridRow::Draft(_) => None,
            GridRow::Persisted(record) => Some(record),
        }
    }
}

impl From<DrugRecord> for GridRow {
    fn from(record: DrugRecord) -> Self {
        GridRow::Persisted(record)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a dose as typed into a form: empty means no dose
pub fn parse_dose(input: &str) -> Result<Option<f64>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("Invalid dose '{input}'"))
}

// Doses arrive as JSON numbers from the backend but as text from import files.
fn number_or_text<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dose {
        Number(f64),
        Text(String),
    }

    match Option::<Dose>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Dose::Number(n)) => Ok(Some(n)),
        Some(Dose::Text(s)) => parse_dose(&s).map_err(serde::de::Error::custom),
    }
}
