//! Row cache and grid state
//!
//! The ordered rows shown for one patient, the single selection, rows marked
//! for a flash and the row the grid should scroll to. All mutation goes
//! through transactional methods that keep two rules: at most one draft row,
//! and a selection that cannot be dropped while rows exist.

use crate::domain::{DrugFields, DrugRecord, GridRow, RowKey};

/// Grid rows plus selection and highlight state
#[derive(Debug, Default, Clone)]
pub struct RowCache {
    rows: Vec<GridRow>,
    selected: Option<RowKey>,
    flashed: Vec<RowKey>,
    scroll_target: Option<RowKey>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with the given key
    pub fn get(&self, key: RowKey) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.key() == key)
    }

    fn position(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|r| r.key() == key)
    }

    /// Replace every row; selection and highlights are dropped
    pub fn replace_all(&mut self, records: Vec<DrugRecord>) {
        self.rows = records.into_iter().map(GridRow::from).collect();
        self.selected = None;
        self.flashed.clear();
        self.scroll_target = None;
    }

    /// Remove every row
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    /// Fields of the draft row, if one exists
    pub fn draft(&self) -> Option<&DrugFields> {
        self.rows.iter().find_map(|r| match r {
            GridRow::Draft(fields) => Some(fields),
            GridRow::Persisted(_) => None,
        })
    }

    pub fn has_draft(&self) -> bool {
        self.draft().is_some()
    }

    /// Insert an empty draft at the top
    ///
    /// Returns `false` without touching the rows when a draft already exists.
    pub fn add_draft(&mut self) -> bool {
        if self.has_draft() {
            return false;
        }
        self.rows.insert(0, GridRow::empty_draft());
        true
    }

    /// Replace the draft row with its stored record, keeping its position
    ///
    /// A selected draft stays selected under its new key. Returns `false` if
    /// there is no draft.
    pub fn promote_draft(&mut self, record: DrugRecord) -> bool {
        let Some(index) = self.position(RowKey::Draft) else {
            return false;
        };
        let key = RowKey::Persisted(record.id);
        self.rows[index] = GridRow::Persisted(record);
        self.rekey(RowKey::Draft, key);
        true
    }

    /// Replace the row with the same id in place
    ///
    /// Returns `false` if no row has that id.
    pub fn merge(&mut self, record: DrugRecord) -> bool {
        match self.position(RowKey::Persisted(record.id)) {
            Some(index) => {
                self.rows[index] = GridRow::Persisted(record);
                true
            }
            None => false,
        }
    }

    /// Merge the record, or append it if no row has its id
    pub fn upsert(&mut self, record: DrugRecord) {
        if let Some(index) = self.position(RowKey::Persisted(record.id)) {
            self.rows[index] = GridRow::Persisted(record);
        } else {
            self.rows.push(GridRow::Persisted(record));
        }
    }

    /// Append records at the end; returns the keys added
    pub fn append(&mut self, records: Vec<DrugRecord>) -> Vec<RowKey> {
        let mut keys = Vec::with_capacity(records.len());
        for record in records {
            keys.push(RowKey::Persisted(record.id));
            self.upsert(record);
        }
        keys
    }

    /// Currently selected key
    pub fn selected(&self) -> Option<RowKey> {
        self.selected
    }

    /// Currently selected row
    pub fn selected_row(&self) -> Option<&GridRow> {
        self.selected.and_then(|key| self.get(key))
    }

    /// Select the row with `key`; returns the row if it exists
    pub fn select(&mut self, key: RowKey) -> Option<&GridRow> {
        let index = self.position(key)?;
        self.selected = Some(key);
        Some(&self.rows[index])
    }

    /// Drop the selection; refused while any row exists
    pub fn deselect(&mut self) -> bool {
        if self.rows.is_empty() {
            self.selected = None;
            return true;
        }
        false
    }

    /// Mark rows for a transient highlight
    pub fn flash(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        for key in keys {
            if !self.flashed.contains(&key) {
                self.flashed.push(key);
            }
        }
    }

    /// Rows marked for a flash since the last call, cleared on read
    pub fn take_flashed(&mut self) -> Vec<RowKey> {
        std::mem::take(&mut self.flashed)
    }

    /// Ask the grid to scroll `key` into view
    pub fn ensure_visible(&mut self, key: RowKey) {
        self.scroll_target = Some(key);
    }

    pub fn take_scroll_target(&mut self) -> Option<RowKey> {
        self.scroll_target.take()
    }

    /// Select, scroll to and flash a row, as the add action does
    pub fn select_and_flash(&mut self, key: RowKey) -> bool {
        if self.select(key).is_none() {
            return false;
        }
        self.ensure_visible(key);
        self.flash([key]);
        true
    }

    fn rekey(&mut self, from: RowKey, to: RowKey) {
        if self.selected == Some(from) {
            self.selected = Some(to);
        }
        if self.scroll_target == Some(from) {
            self.scroll_target = Some(to);
        }
        for key in self.flashed.iter_mut().filter(|k| **k == from) {
            *key = to;
        }
    }
}
