//! Screen state machine
//!
//! `NoPatient -> Loading -> Loaded <-> Editing -> Saving -> Loaded`.
//! A patient change forces `Loading` from any state. `Saving` lasts exactly as
//! long as the write: a refresh or finished load does not leave it. Events
//! that do not apply to the current state leave it unchanged.

use crate::domain::PatientKey;
use std::fmt;

/// Phase of the medication screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    /// No patient selected; the grid is empty
    NoPatient,
    /// A full reload for the patient is outstanding
    Loading { patient: PatientKey },
    /// Rows shown; the form, if any, matches its row
    Loaded { patient: PatientKey },
    /// The form differs from the row it was copied from
    Editing { patient: PatientKey },
    /// A write is outstanding
    Saving { patient: PatientKey },
}

/// Inputs to [`ScreenState::on`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    PatientSelected(PatientKey),
    PatientCleared,
    RefreshRequested,
    LoadFinished,
    FormDiverged,
    FormMatched,
    SaveStarted,
    SaveFinished,
}

impl ScreenState {
    /// Patient the screen is showing, if any
    pub fn patient(&self) -> Option<&PatientKey> {
        match self {
            ScreenState::NoPatient => None,
            ScreenState::Loading { patient }
            | ScreenState::Loaded { patient }
            | ScreenState::Editing { patient }
            | ScreenState::Saving { patient } => Some(patient),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading { .. })
    }

    pub fn is_saving(&self) -> bool {
        matches!(self, ScreenState::Saving { .. })
    }

    /// Next state after `event`
    pub fn on(&self, event: &ScreenEvent) -> ScreenState {
        use ScreenEvent as E;
        use ScreenState as S;

        match (self, event) {
            (_, E::PatientSelected(patient)) => S::Loading {
                patient: patient.clone(),
            },
            (_, E::PatientCleared) => S::NoPatient,

            (S::NoPatient, _) => S::NoPatient,

            (
                S::Loading { patient } | S::Loaded { patient } | S::Editing { patient },
                E::RefreshRequested,
            ) => S::Loading {
                patient: patient.clone(),
            },

            (S::Loading { patient }, E::LoadFinished) => S::Loaded {
                patient: patient.clone(),
            },

            (S::Loaded { patient }, E::FormDiverged) => S::Editing {
                patient: patient.clone(),
            },
            (S::Editing { patient }, E::FormMatched) => S::Loaded {
                patient: patient.clone(),
            },

            (S::Loaded { patient } | S::Editing { patient }, E::SaveStarted) => S::Saving {
                patient: patient.clone(),
            },
            (S::Saving { patient }, E::SaveFinished) => S::Loaded {
                patient: patient.clone(),
            },

            (s, _) => s.clone(),
        }
    }
}

impl fmt::Display for ScreenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenState::NoPatient => write!(f, "no patient"),
            ScreenState::Loading { patient } => write!(f, "loading {patient}"),
            ScreenState::Loaded { patient } => write!(f, "loaded {patient}"),
            ScreenState::Editing { patient } => write!(f, "editing {patient}"),
            ScreenState::Saving { patient } => write!(f, "saving {patient}"),
        }
    }
}
