//! In-process store
//!
//! Keeps records in a vector behind a mutex. Used for dry runs, where nothing
//! may leave the process. [`MemoryStore::calls`] shows what would have been
//! sent; unit tests can also script the next response.

use super::traits::{RemoteStore, StoreResult};
use crate::domain::{DrugPatch, DrugRecord, NewDrugRecord, PatientKey, RecordId, StoreError};
use async_trait::async_trait;
#[cfg(test)]
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A scripted outcome for the next write or query
#[cfg(test)]
#[derive(Debug)]
pub enum Scripted {
    /// Fail the next call with this error
    Fail(StoreError),
    /// Succeed without touching storage and return no rows
    Empty,
}

/// Counters and payloads recorded by [`MemoryStore`]
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    pub queries: usize,
    pub inserts: usize,
    pub updates: usize,
    /// Every insert payload, one entry per call
    pub inserted: Vec<Vec<NewDrugRecord>>,
    /// Every update, one entry per call
    pub updated: Vec<(RecordId, DrugPatch)>,
}

impl CallLog {
    /// Total number of calls of any kind
    pub fn total(&self) -> usize {
        self.queries + self.inserts + self.updates
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<DrugRecord>,
    next_id: i64,
    #[cfg(test)]
    script: VecDeque<Scripted>,
    calls: CallLog,
}

/// [`RemoteStore`] held entirely in memory
#[derive(Debug)]
pub struct MemoryStore {
    collection: String,
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store for `collection`
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            state: Mutex::new(MemoryState {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Seed the store with existing records; new ids continue after the largest
    pub fn with_records(self, records: Vec<DrugRecord>) -> Self {
        {
            let mut state = self.lock();
            let max_id = records.iter().map(|r| r.id.get()).max().unwrap_or(0);
            state.next_id = state.next_id.max(max_id + 1);
            state.rows.extend(records);
        }
        self
    }

    /// Queue an outcome for the next call, in FIFO order
    #[cfg(test)]
    pub fn script(&self, outcome: Scripted) {
        self.lock().script.push_back(outcome);
    }

    /// Snapshot of the recorded calls
    pub fn calls(&self) -> CallLog {
        self.lock().calls.clone()
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<DrugRecord> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("drugs")
    }
}

impl MemoryState {
    #[cfg(test)]
    fn scripted(&mut self) -> Option<StoreResult<Vec<DrugRecord>>> {
        self.script.pop_front().map(|outcome| match outcome {
            Scripted::Fail(e) => Err(e),
            Scripted::Empty => Ok(Vec::new()),
        })
    }

    #[cfg(not(test))]
    fn scripted(&mut self) -> Option<StoreResult<Vec<DrugRecord>>> {
        None
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn query(&self, ptkey: &PatientKey) -> StoreResult<Vec<DrugRecord>> {
        let mut state = self.lock();
        state.calls.queries += 1;

        if let Some(result) = state.scripted() {
            return result;
        }

        Ok(state
            .rows
            .iter()
            .filter(|r| &r.ptkey == ptkey)
            .cloned()
            .collect())
    }

    async fn insert(&self, rows: &[NewDrugRecord]) -> StoreResult<Vec<DrugRecord>> {
        let mut state = self.lock();
        state.calls.inserts += 1;
        state.calls.inserted.push(rows.to_vec());

        if let Some(result) = state.scripted() {
            return result;
        }

        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let id = RecordId::new(state.next_id)
                .map_err(|e| StoreError::InvalidResponse(format!("id sequence: {e}")))?;
            state.next_id += 1;
            created.push(DrugRecord::new(id, row.ptkey.clone(), row.fields.clone()));
        }
        state.rows.extend(created.iter().cloned());

        Ok(created)
    }

    async fn update(&self, id: RecordId, patch: &DrugPatch) -> StoreResult<Vec<DrugRecord>> {
        let mut state = self.lock();
        state.calls.updates += 1;
        state.calls.updated.push((id, patch.clone()));

        if let Some(result) = state.scripted() {
            return result;
        }

        Ok(state
            .rows
            .iter_mut()
            .filter(|r| r.id == id)
            .map(|r| {
                r.fields.name = patch.name.clone();
                r.fields.dose = patch.dose;
                r.fields.time = patch.time.clone();
                r.fields.notes = patch.notes.clone();
                r.clone()
            })
            .collect())
    }
}
