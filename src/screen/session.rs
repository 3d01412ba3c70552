//! Cross-screen session context
//!
//! The patient list and the selected patient are shared by every screen of
//! the application. Selection is published through a `watch` channel so a
//! screen reacts to the latest value only; the list is a snapshot replaced
//! wholesale.

use crate::domain::PatientKey;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Entry of the shared patient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub key: PatientKey,
    pub label: String,
}

/// Shared patient list and selection
#[derive(Debug, Clone)]
pub struct SessionContext {
    selected: Arc<watch::Sender<Option<PatientKey>>>,
    patients: Arc<RwLock<Arc<Vec<PatientSummary>>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (selected, _) = watch::channel(None);
        Self {
            selected: Arc::new(selected),
            patients: Arc::new(RwLock::new(Arc::new(Vec::new()))),
        }
    }

    /// Publish the selected patient; `None` clears the selection
    ///
    /// Subscribers are only woken when the value changes.
    pub fn select_patient(&self, patient: Option<PatientKey>) {
        self.selected.send_if_modified(|current| {
            if *current == patient {
                return false;
            }
            *current = patient;
            true
        });
    }

    /// Currently selected patient
    pub fn selected(&self) -> Option<PatientKey> {
        self.selected.borrow().clone()
    }

    /// Receiver for selection changes
    pub fn subscribe(&self) -> watch::Receiver<Option<PatientKey>> {
        self.selected.subscribe()
    }

    /// Replace the shared patient list
    pub fn publish_patients(&self, patients: Vec<PatientSummary>) {
        let mut guard = self.patients.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(patients);
    }

    /// Snapshot of the patient list
    pub fn patients(&self) -> Arc<Vec<PatientSummary>> {
        self.patients
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
