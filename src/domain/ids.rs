//! Domain identifier types with validation
//!
//! Newtype wrappers for the two keys the drugs table is addressed by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient key newtype wrapper
///
/// The foreign key every drug record carries. Never empty; a draft row has no
/// patient key at all rather than an empty one.
///
/// # Examples
///
/// ```
/// use dosebook::domain::ids::PatientKey;
/// use std::str::FromStr;
///
/// let key = PatientKey::from_str("P1").unwrap();
/// assert_eq!(key.as_str(), "P1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientKey(String);

impl PatientKey {
    /// Creates a new PatientKey from a string
    ///
    /// Returns `Err` if the key is empty or whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Patient key cannot be empty".to_string());
        }
        Ok(Self(key))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PatientKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PatientKey> for String {
    fn from(key: PatientKey) -> Self {
        key.0
    }
}

impl AsRef<str> for PatientKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Record identifier assigned by the backend
///
/// Always positive. Unsaved rows are represented by
/// [`RowKey::Draft`](crate::domain::record::RowKey::Draft), never by a zero id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RecordId(i64);

impl RecordId {
    /// Creates a new RecordId, rejecting zero and negative values
    pub fn new(id: i64) -> Result<Self, String> {
        if id <= 0 {
            return Err(format!("Record id must be positive, got {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the raw integer id
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: i64 = s
            .trim()
            .parse()
            .map_err(|e| format!("Invalid record id '{s}': {e}"))?;
        Self::new(id)
    }
}

impl TryFrom<i64> for RecordId {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_key_valid() {
        let key = PatientKey::new("P1").unwrap();
        assert_eq!(key.as_str(), "P1");
        assert_eq!(key.to_string(), "P1");
    }

    #[test]
    fn test_patient_key_empty() {
        assert!(PatientKey::new("").is_err());
        assert!(PatientKey::new("   ").is_err());
    }

    #[test]
    fn test_patient_key_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<PatientKey>(r#""""#).is_err());
        let key: PatientKey = serde_json::from_str(r#""P9""#).unwrap();
        assert_eq!(key.as_str(), "P9");
    }

    #[test]
    fn test_record_id_rejects_zero() {
        assert!(RecordId::new(0).is_err());
        assert!(RecordId::new(-3).is_err());
        assert_eq!(RecordId::new(7).unwrap().get(), 7);
    }

    #[test]
    fn test_record_id_from_str() {
        assert_eq!(RecordId::from_str(" 42 ").unwrap().get(), 42);
        assert!(RecordId::from_str("abc").is_err());
        assert!(RecordId::from_str("0").is_err());
    }

    #[test]
    fn test_record_id_serde_is_plain_integer() {
        let id = RecordId::new(12).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "12");
        assert!(serde_json::from_str::<RecordId>("0").is_err());
    }
}
