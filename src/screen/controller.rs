//! Medication screen controller
//!
//! [`DrugsScreen`] owns the row cache, the detail form, the column layout, the
//! import modal and the notification stack, and moves between
//! [`ScreenState`]s as intents and remote responses arrive.
//!
//! Every remote operation is split in two. A `begin_*` call checks the
//! preconditions, applies the immediate effects and returns a ticket (or
//! `None` when the intent is ignored). A `finish_*` call takes the ticket and
//! the store result and reconciles the screen. The async helpers (`load_patient`,
//! `refresh`, `save`, `confirm_import`, `dispatch`) just run the two halves
//! around the store call.
//!
//! Loads carry the load generation current at begin time; a load finished
//! under an older generation is dropped. Writes carry the patient epoch, so a
//! refresh does not drop a save but a patient switch does.

use crate::adapters::store::{RemoteStore, StoreResult};
use crate::config::ScreenConfig;
use crate::domain::{
    DrugPatch, DrugRecord, GridRow, NewDrugRecord, PatientKey, RecordId, RowKey,
};
use crate::screen::cache::RowCache;
use crate::screen::columns::ColumnLayout;
use crate::screen::form::{suggest, DraftForm};
use crate::screen::import::{into_new_records, ImportModal, ImportRow};
use crate::screen::notify::{Notification, Notifications, IMPORT_TOAST, SAVE_TOAST};
use crate::screen::state::{ScreenEvent, ScreenState};
use crate::screen::toolbar::ToolbarAction;
use crate::{log_precondition_skip, log_stale_response, log_store_failure};
use std::sync::Arc;
use tokio::sync::watch;

const NOT_ADDED: &str = "Data was not added! Try again.";
const NOT_SAVED: &str = "Data was not saved! Try again.";
const LOAD_BACKEND_FAILED: &str = "Error getting data";
const LOAD_TRANSPORT_FAILED: &str = "Error loading data";

/// Handle for an outstanding full reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub patient: PatientKey,
    pub generation: u64,
}

/// What a write is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update(RecordId),
    Bulk,
}

impl WriteKind {
    fn operation(self) -> &'static str {
        match self {
            WriteKind::Insert => "insert",
            WriteKind::Update(_) => "update",
            WriteKind::Bulk => "bulk_insert",
        }
    }

    fn toast(self) -> &'static str {
        match self {
            WriteKind::Bulk => IMPORT_TOAST,
            _ => SAVE_TOAST,
        }
    }
}

/// Handle for an outstanding write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTicket {
    pub patient: PatientKey,
    pub epoch: u64,
    pub kind: WriteKind,
}

/// The remote call a write needs
#[derive(Debug, Clone, PartialEq)]
pub enum SaveCall {
    Insert(NewDrugRecord),
    Update { id: RecordId, patch: DrugPatch },
    Bulk(Vec<NewDrugRecord>),
}

impl SaveCall {
    /// Send the call to `store`
    pub async fn send(&self, store: &dyn RemoteStore) -> StoreResult<Vec<DrugRecord>> {
        match self {
            SaveCall::Insert(row) => store.insert(std::slice::from_ref(row)).await,
            SaveCall::Update { id, patch } => store.update(*id, patch).await,
            SaveCall::Bulk(rows) => store.insert(rows).await,
        }
    }
}

/// A write ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub ticket: WriteTicket,
    pub call: SaveCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Cache replaced with this many rows
    Loaded(usize),
    /// No patient; cache cleared
    Cleared,
    /// Load failed; cache left as it was
    Failed,
    /// Response superseded by a newer load
    Stale,
    /// Intent ignored
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(RecordId),
    Updated(RecordId),
    Imported(usize),
    /// Backend answered with no rows
    NotApplied,
    Failed,
    /// Response arrived after a patient switch
    Stale,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// New draft row created
    Created,
    /// Existing draft row focused instead
    Focused,
    Skipped,
}

/// Result of a toolbar press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Load(LoadOutcome),
    Save(SaveOutcome),
    Add(AddOutcome),
    ModalOpened,
    ColumnsResized,
    /// The button was disabled
    Disabled,
}

/// The medication grid screen
pub struct DrugsScreen {
    store: Arc<dyn RemoteStore>,
    state: ScreenState,
    cache: RowCache,
    form: Option<DraftForm>,
    columns: ColumnLayout,
    suggestions: Vec<String>,
    notifications: Notifications,
    import: ImportModal,
    generation: u64,
    epoch: u64,
    write_in_flight: bool,
    loading_overlay: bool,
    first_data_rendered: bool,
}

impl DrugsScreen {
    pub fn new(store: Arc<dyn RemoteStore>, config: &ScreenConfig) -> Self {
        Self {
            store,
            state: ScreenState::NoPatient,
            cache: RowCache::new(),
            form: None,
            columns: ColumnLayout::new(config.default_column_width, config.viewport_width),
            suggestions: config.drug_suggestions.clone(),
            notifications: Notifications::new(),
            import: ImportModal::new(),
            generation: 0,
            epoch: 0,
            write_in_flight: false,
            loading_overlay: false,
            first_data_rendered: false,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn patient(&self) -> Option<&PatientKey> {
        self.state.patient()
    }

    pub fn cache(&self) -> &RowCache {
        &self.cache
    }

    pub fn rows(&self) -> &[GridRow] {
        self.cache.rows()
    }

    pub fn form(&self) -> Option<&DraftForm> {
        self.form.as_ref()
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn import(&self) -> &ImportModal {
        &self.import
    }

    pub fn import_mut(&mut self) -> &mut ImportModal {
        &mut self.import
    }

    /// Whether the loading overlay covers the grid
    pub fn loading_overlay(&self) -> bool {
        self.loading_overlay
    }

    pub fn write_in_flight(&self) -> bool {
        self.write_in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rows to flash since the last call
    pub fn take_flashed(&mut self) -> Vec<RowKey> {
        self.cache.take_flashed()
    }

    /// Row to scroll into view, if one was requested
    pub fn take_scroll_target(&mut self) -> Option<RowKey> {
        self.cache.take_scroll_target()
    }

    /// Name suggestions for the form's name input
    pub fn suggestions(&self, typed: &str) -> Vec<&str> {
        suggest(&self.suggestions, typed)
    }

    pub fn is_enabled(&self, action: ToolbarAction) -> bool {
        action.is_enabled(self.write_in_flight)
    }

    fn transition(&mut self, event: ScreenEvent) {
        let next = self.state.on(&event);
        if next != self.state {
            tracing::debug!(from = %self.state, to = %next, ?event, "Screen transition");
            self.state = next;
        }
    }

    // ---- loading ----

    /// Switch to `patient`, or clear the screen for `None`
    ///
    /// A switch discards the cache, the form and any outstanding write,
    /// including its pending toast. Selecting the patient already shown is a
    /// refresh.
    pub fn select_patient(&mut self, patient: Option<PatientKey>) -> Option<LoadTicket> {
        if patient.as_ref() == self.patient() && patient.is_some() {
            return self.begin_refresh();
        }

        if self.write_in_flight {
            tracing::info!("Outstanding write abandoned by patient change");
            self.notifications.dismiss_pending(SAVE_TOAST);
            self.notifications.dismiss_pending(IMPORT_TOAST);
        }
        self.epoch += 1;
        self.generation += 1;
        self.write_in_flight = false;
        self.cache.clear();
        self.form = None;

        match patient {
            Some(patient) => {
                tracing::info!(patient = %patient, "Patient selected");
                self.transition(ScreenEvent::PatientSelected(patient.clone()));
                self.loading_overlay = true;
                Some(LoadTicket {
                    patient,
                    generation: self.generation,
                })
            }
            None => {
                tracing::info!("Patient cleared");
                self.transition(ScreenEvent::PatientCleared);
                self.loading_overlay = false;
                None
            }
        }
    }

    /// Reload the current patient's rows
    pub fn begin_refresh(&mut self) -> Option<LoadTicket> {
        let Some(patient) = self.patient().cloned() else {
            log_precondition_skip!("refresh", "no patient selected");
            return None;
        };

        self.generation += 1;
        self.loading_overlay = true;
        self.transition(ScreenEvent::RefreshRequested);
        Some(LoadTicket {
            patient,
            generation: self.generation,
        })
    }

    /// Apply a load response
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: StoreResult<Vec<DrugRecord>>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            log_stale_response!("query", ticket.generation, self.generation);
            return LoadOutcome::Stale;
        }

        self.loading_overlay = false;
        self.transition(ScreenEvent::LoadFinished);

        match result {
            Ok(records) => {
                let records: Vec<DrugRecord> = records
                    .into_iter()
                    .filter(|r| r.ptkey == ticket.patient)
                    .collect();
                let count = records.len();
                self.cache.replace_all(records);
                self.form = None;

                if !self.first_data_rendered && count > 0 {
                    self.columns.size_to_fit();
                    self.first_data_rendered = true;
                }

                tracing::info!(patient = %ticket.patient, rows = count, "Rows loaded");
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                log_store_failure!("query", &e);
                let message = if e.is_backend() {
                    LOAD_BACKEND_FAILED
                } else {
                    LOAD_TRANSPORT_FAILED
                };
                self.notifications.push(Notification::error(message));
                LoadOutcome::Failed
            }
        }
    }

    async fn run_load(&mut self, ticket: LoadTicket) -> LoadOutcome {
        let store = Arc::clone(&self.store);
        let result = store.query(&ticket.patient).await;
        self.finish_load(ticket, result)
    }

    /// Switch patient and load its rows
    pub async fn load_patient(&mut self, patient: Option<PatientKey>) -> LoadOutcome {
        match self.select_patient(patient) {
            Some(ticket) => self.run_load(ticket).await,
            None => LoadOutcome::Cleared,
        }
    }

    /// Reload the current patient
    pub async fn refresh(&mut self) -> LoadOutcome {
        match self.begin_refresh() {
            Some(ticket) => self.run_load(ticket).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Follow the session's patient selection until the session is dropped
    pub async fn follow(&mut self, mut selected: watch::Receiver<Option<PatientKey>>) {
        let current = selected.borrow_and_update().clone();
        if current.as_ref() != self.patient() {
            self.load_patient(current).await;
        }

        while selected.changed().await.is_ok() {
            let patient = selected.borrow_and_update().clone();
            self.load_patient(patient).await;
        }
    }

    // ---- selection and form ----

    /// A row was selected in the grid; copy it into the form
    pub fn row_selected(&mut self, key: RowKey) -> bool {
        let Some(row) = self.cache.select(key) else {
            log_precondition_skip!("select", "row not in cache");
            return false;
        };
        self.form = Some(DraftForm::from_row(row));
        self.sync_form_state();
        true
    }

    /// The grid asked to drop the selection
    pub fn try_deselect(&mut self) -> bool {
        if !self.cache.deselect() {
            log_precondition_skip!("deselect", "selection is sticky");
            return false;
        }
        self.form = None;
        true
    }

    /// Edit the form, if there is one
    pub fn edit_form<R>(&mut self, edit: impl FnOnce(&mut DraftForm) -> R) -> Option<R> {
        let result = edit(self.form.as_mut()?);
        self.sync_form_state();
        Some(result)
    }

    fn sync_form_state(&mut self) {
        let diverged = self.form.as_ref().is_some_and(|form| {
            self.cache
                .get(form.source)
                .is_some_and(|row| form.diverges_from(row))
        });
        self.transition(if diverged {
            ScreenEvent::FormDiverged
        } else {
            ScreenEvent::FormMatched
        });
    }

    /// Add a draft row, or focus the one that exists
    pub fn add_draft(&mut self) -> AddOutcome {
        if self.patient().is_none() {
            log_precondition_skip!("add", "no patient selected");
            return AddOutcome::Skipped;
        }

        let outcome = if self.cache.has_draft() {
            AddOutcome::Focused
        } else {
            self.cache.add_draft();
            AddOutcome::Created
        };

        let already_selected = self.cache.selected() == Some(RowKey::Draft);
        self.cache.select_and_flash(RowKey::Draft);
        if !already_selected {
            self.form = self.cache.get(RowKey::Draft).map(DraftForm::from_row);
        }
        self.sync_form_state();
        outcome
    }

    // ---- saving ----

    /// Build the insert or update for the selected row
    ///
    /// Ignored without a patient, while rows are loading or a write is
    /// outstanding, without a selection, or when the form belongs to a
    /// different row.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        let Some(patient) = self.patient().cloned() else {
            log_precondition_skip!("save", "no patient selected");
            return None;
        };
        if self.state.is_loading() {
            log_precondition_skip!("save", "rows are loading");
            return None;
        }
        if self.write_in_flight {
            log_precondition_skip!("save", "save already in flight");
            return None;
        }
        let Some(selected) = self.cache.selected() else {
            log_precondition_skip!("save", "no row selected");
            return None;
        };
        let Some(form) = self.form.as_ref().filter(|f| f.source == selected) else {
            log_precondition_skip!("save", "form does not match selection");
            return None;
        };

        let (kind, call, pending) = match selected {
            RowKey::Draft => (
                WriteKind::Insert,
                SaveCall::Insert(NewDrugRecord::new(patient.clone(), form.fields.clone())),
                "Adding...",
            ),
            RowKey::Persisted(id) => (
                WriteKind::Update(id),
                SaveCall::Update {
                    id,
                    patch: DrugPatch::from(&form.fields),
                },
                "Saving...",
            ),
        };

        self.start_write(kind, pending);
        Some(SaveRequest {
            ticket: WriteTicket {
                patient,
                epoch: self.epoch,
                kind,
            },
            call,
        })
    }

    fn start_write(&mut self, kind: WriteKind, pending: &str) {
        self.write_in_flight = true;
        self.transition(ScreenEvent::SaveStarted);
        self.notifications
            .push(Notification::loading(pending).keyed(kind.toast()));
        tracing::debug!(operation = kind.operation(), "Write started");
    }

    /// Build the batch insert for rows confirmed in the import modal
    pub fn begin_bulk_insert(&mut self, rows: Vec<ImportRow>) -> Option<SaveRequest> {
        let Some(patient) = self.patient().cloned() else {
            log_precondition_skip!("bulk_insert", "no patient selected");
            return None;
        };
        if self.state.is_loading() {
            log_precondition_skip!("bulk_insert", "rows are loading");
            return None;
        }
        if self.write_in_flight {
            log_precondition_skip!("bulk_insert", "save already in flight");
            return None;
        }
        if rows.is_empty() {
            log_precondition_skip!("bulk_insert", "no rows");
            return None;
        }

        let payload = into_new_records(rows, &patient);
        self.start_write(WriteKind::Bulk, "Saving...");
        Some(SaveRequest {
            ticket: WriteTicket {
                patient,
                epoch: self.epoch,
                kind: WriteKind::Bulk,
            },
            call: SaveCall::Bulk(payload),
        })
    }

    /// Apply a write response
    pub fn finish_save(
        &mut self,
        ticket: WriteTicket,
        result: StoreResult<Vec<DrugRecord>>,
    ) -> SaveOutcome {
        let operation = ticket.kind.operation();
        if ticket.epoch != self.epoch {
            log_stale_response!(operation, ticket.epoch, self.epoch);
            return SaveOutcome::Stale;
        }

        self.write_in_flight = false;
        self.transition(ScreenEvent::SaveFinished);
        if self.loading_overlay {
            // A refresh issued during the write is still outstanding
            self.transition(ScreenEvent::RefreshRequested);
        }
        let toast = ticket.kind.toast();

        let outcome = match result {
            Err(e) => {
                log_store_failure!(operation, &e);
                self.notifications
                    .push(Notification::error(e.to_string()).keyed(toast));
                SaveOutcome::Failed
            }
            Ok(records) if records.is_empty() => {
                let message = match ticket.kind {
                    WriteKind::Update(_) => NOT_SAVED,
                    WriteKind::Insert | WriteKind::Bulk => NOT_ADDED,
                };
                tracing::warn!(operation, "Backend returned no rows");
                self.notifications
                    .push(Notification::warning(message).keyed(toast));
                SaveOutcome::NotApplied
            }
            Ok(records) => match ticket.kind {
                WriteKind::Insert => self.apply_insert(&ticket.patient, records),
                WriteKind::Update(id) => self.apply_update(id, records),
                WriteKind::Bulk => self.apply_bulk(&ticket.patient, records),
            },
        };

        self.sync_form_state();
        outcome
    }

    fn apply_insert(&mut self, patient: &PatientKey, records: Vec<DrugRecord>) -> SaveOutcome {
        let Some(record) = records.into_iter().next() else {
            return SaveOutcome::NotApplied;
        };
        let id = record.id;
        let key = RowKey::Persisted(id);

        if self.form.as_ref().is_some_and(|f| f.source == RowKey::Draft) {
            self.form = Some(DraftForm::from_record(&record));
        }
        if !self.cache.promote_draft(record.clone()) && &record.ptkey == patient {
            self.cache.upsert(record);
        }
        self.cache.ensure_visible(key);
        self.cache.flash([key]);

        tracing::info!(id = id.get(), "Row added");
        self.notifications
            .push(Notification::success("Added").keyed(SAVE_TOAST));
        SaveOutcome::Inserted(id)
    }

    fn apply_update(&mut self, id: RecordId, records: Vec<DrugRecord>) -> SaveOutcome {
        let Some(record) = records.into_iter().find(|r| r.id == id) else {
            tracing::warn!(id = id.get(), "Update returned a different row");
            self.notifications
                .push(Notification::warning(NOT_SAVED).keyed(SAVE_TOAST));
            return SaveOutcome::NotApplied;
        };
        let key = RowKey::Persisted(id);

        if self.form.as_ref().is_some_and(|f| f.source == key) {
            self.form = Some(DraftForm::from_record(&record));
        }
        if self.cache.merge(record) {
            self.cache.ensure_visible(key);
            self.cache.flash([key]);
        } else {
            tracing::debug!(id = id.get(), "Updated row no longer in cache");
        }

        tracing::info!(id = id.get(), "Row saved");
        self.notifications
            .push(Notification::success("Saved").keyed(SAVE_TOAST));
        SaveOutcome::Updated(id)
    }

    fn apply_bulk(&mut self, patient: &PatientKey, records: Vec<DrugRecord>) -> SaveOutcome {
        let records: Vec<DrugRecord> = records
            .into_iter()
            .filter(|r| &r.ptkey == patient)
            .collect();
        let keys = self.cache.append(records);
        let count = keys.len();
        self.cache.flash(keys);

        tracing::info!(rows = count, "Rows imported");
        self.notifications
            .push(Notification::success(format!("Added {count} rows")).keyed(IMPORT_TOAST));
        SaveOutcome::Imported(count)
    }

    async fn run_write(&mut self, request: SaveRequest) -> SaveOutcome {
        let store = Arc::clone(&self.store);
        let result = request.call.send(store.as_ref()).await;
        self.finish_save(request.ticket, result)
    }

    /// Save the selected row
    pub async fn save(&mut self) -> SaveOutcome {
        match self.begin_save() {
            Some(request) => self.run_write(request).await,
            None => SaveOutcome::Skipped,
        }
    }

    /// Confirm the import modal and insert its rows
    ///
    /// The modal stays open with its rows when there is no patient, rows are
    /// loading or a write is outstanding.
    pub async fn confirm_import(&mut self) -> SaveOutcome {
        if self.patient().is_none() || self.state.is_loading() || self.write_in_flight {
            log_precondition_skip!("bulk_insert", "cannot confirm import now");
            return SaveOutcome::Skipped;
        }
        let rows = self.import.confirm();
        match self.begin_bulk_insert(rows) {
            Some(request) => self.run_write(request).await,
            None => SaveOutcome::Skipped,
        }
    }

    // ---- toolbar ----

    /// Run a toolbar intent
    pub async fn dispatch(&mut self, action: ToolbarAction) -> ActionOutcome {
        if !self.is_enabled(action) {
            log_precondition_skip!(action.label(), "button disabled");
            return ActionOutcome::Disabled;
        }

        match action {
            ToolbarAction::Save => ActionOutcome::Save(self.save().await),
            ToolbarAction::Add => ActionOutcome::Add(self.add_draft()),
            ToolbarAction::AddMany => {
                self.import.open();
                ActionOutcome::ModalOpened
            }
            ToolbarAction::Refresh => ActionOutcome::Load(self.refresh().await),
            ToolbarAction::AutoSizeColumns => {
                self.columns.auto_size(self.cache.rows());
                ActionOutcome::ColumnsResized
            }
            ToolbarAction::SizeColumnsToFit => {
                self.columns.size_to_fit();
                ActionOutcome::ColumnsResized
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::{MemoryStore, Scripted};
    use crate::domain::{DrugFields, StoreError};
    use crate::screen::notify::Severity;
    use crate::screen::session::SessionContext;

    fn key(k: &str) -> PatientKey {
        PatientKey::new(k).unwrap()
    }

    fn id(n: i64) -> RecordId {
        RecordId::new(n).unwrap()
    }

    fn record(n: i64, ptkey: &str, name: &str) -> DrugRecord {
        DrugRecord::new(id(n), key(ptkey), DrugFields::named(name))
    }

    fn screen_with(records: Vec<DrugRecord>) -> (DrugsScreen, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default().with_records(records));
        let screen = DrugsScreen::new(store.clone(), &ScreenConfig::default());
        (screen, store)
    }

    fn save_toast(screen: &DrugsScreen) -> &Notification {
        screen.notifications().get(SAVE_TOAST).unwrap()
    }

    #[tokio::test]
    async fn test_load_only_patient_rows() {
        let (mut screen, _) = screen_with(vec![
            record(1, "P1", "Insulin"),
            record(2, "P2", "Prednisolon"),
            record(3, "P1", "L-Asparginase"),
        ]);

        let outcome = screen.load_patient(Some(key("P1"))).await;

        assert_eq!(outcome, LoadOutcome::Loaded(2));
        assert!(screen
            .rows()
            .iter()
            .all(|r| r.ptkey() == Some(&key("P1"))));
        assert_eq!(screen.state(), &ScreenState::Loaded { patient: key("P1") });
        assert!(!screen.loading_overlay());
    }

    #[test]
    fn test_load_filters_foreign_rows_from_response() {
        let (mut screen, _) = screen_with(vec![]);
        let ticket = screen.select_patient(Some(key("P1"))).unwrap();
        assert!(screen.loading_overlay());

        let backend_row: DrugRecord = serde_json::from_value(serde_json::json!({
            "id": 1, "ptkey": "P1", "name": "Insulin", "dose": 5, "time": "2024-01-01", "notes": ""
        }))
        .unwrap();
        let outcome = screen.finish_load(ticket, Ok(vec![backend_row.clone(), record(2, "P9", "X")]));

        assert_eq!(outcome, LoadOutcome::Loaded(1));
        assert_eq!(screen.rows(), &[GridRow::Persisted(backend_row)]);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let (mut screen, _) = screen_with(vec![]);
        let first = screen.select_patient(Some(key("P1"))).unwrap();
        let second = screen.begin_refresh().unwrap();

        let outcome = screen.finish_load(first, Ok(vec![record(1, "P1", "Old")]));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(screen.rows().is_empty());
        assert!(screen.loading_overlay());

        let outcome = screen.finish_load(second, Ok(vec![record(2, "P1", "New")]));
        assert_eq!(outcome, LoadOutcome::Loaded(1));
        assert_eq!(screen.rows()[0].fields().name, "New");
    }

    #[test]
    fn test_load_after_patient_switch_is_discarded() {
        let (mut screen, _) = screen_with(vec![]);
        let p1 = screen.select_patient(Some(key("P1"))).unwrap();
        let _p2 = screen.select_patient(Some(key("P2"))).unwrap();

        assert_eq!(
            screen.finish_load(p1, Ok(vec![record(1, "P1", "Insulin")])),
            LoadOutcome::Stale
        );
        assert!(screen.rows().is_empty());
        assert_eq!(screen.patient(), Some(&key("P2")));
    }

    #[tokio::test]
    async fn test_load_failure_keeps_cache() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;

        store.script(Scripted::Fail(StoreError::ConnectionFailed("refused".into())));
        assert_eq!(screen.refresh().await, LoadOutcome::Failed);
        assert_eq!(screen.rows().len(), 1);
        assert_eq!(
            screen.notifications().latest().unwrap().message,
            LOAD_TRANSPORT_FAILED
        );

        store.script(Scripted::Fail(StoreError::Backend {
            status: 400,
            message: "{\"code\":\"42P01\"}".into(),
        }));
        assert_eq!(screen.refresh().await, LoadOutcome::Failed);
        assert_eq!(
            screen.notifications().latest().unwrap().message,
            LOAD_BACKEND_FAILED
        );
        assert_eq!(screen.state(), &ScreenState::Loaded { patient: key("P1") });
    }

    #[tokio::test]
    async fn test_clearing_patient_empties_cache() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;

        assert_eq!(screen.load_patient(None).await, LoadOutcome::Cleared);
        assert!(screen.rows().is_empty());
        assert_eq!(screen.state(), &ScreenState::NoPatient);
        assert_eq!(store.calls().queries, 1);
    }

    #[tokio::test]
    async fn test_add_without_patient_does_nothing() {
        let (mut screen, store) = screen_with(vec![]);
        assert_eq!(screen.add_draft(), AddOutcome::Skipped);
        assert!(screen.rows().is_empty());
        assert_eq!(store.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_add_draft_is_idempotent() {
        let (mut screen, _) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;

        assert_eq!(screen.add_draft(), AddOutcome::Created);
        assert_eq!(screen.rows()[0].key(), RowKey::Draft);
        assert_eq!(screen.take_flashed(), vec![RowKey::Draft]);
        assert_eq!(screen.take_scroll_target(), Some(RowKey::Draft));

        screen.edit_form(|f| f.set_name("Insulin"));
        assert_eq!(screen.add_draft(), AddOutcome::Focused);

        let drafts = screen.rows().iter().filter(|r| r.key().is_draft()).count();
        assert_eq!(drafts, 1);
        assert_eq!(screen.rows().len(), 2);
        // focusing the already selected draft keeps the edits
        assert_eq!(screen.form().unwrap().fields.name, "Insulin");
        assert_eq!(screen.take_flashed(), vec![RowKey::Draft]);
    }

    #[tokio::test]
    async fn test_insert_promotes_draft() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.add_draft();
        screen.edit_form(|f| {
            f.set_name("Prednisolon");
            f.set_dose(Some(40.0));
        });
        assert_eq!(screen.state(), &ScreenState::Editing { patient: key("P1") });

        let outcome = screen.save().await;

        let SaveOutcome::Inserted(new_id) = outcome else {
            panic!("expected insert, got {outcome:?}");
        };
        assert!(!screen.cache().has_draft());
        let matching: Vec<_> = screen
            .rows()
            .iter()
            .filter(|r| r.key() == RowKey::Persisted(new_id))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].fields().name, "Prednisolon");
        assert_eq!(matching[0].fields().dose, Some(40.0));
        assert_eq!(screen.cache().selected(), Some(RowKey::Persisted(new_id)));
        assert_eq!(screen.form().unwrap().source, RowKey::Persisted(new_id));
        assert_eq!(screen.state(), &ScreenState::Loaded { patient: key("P1") });
        assert_eq!(save_toast(&screen).severity, Severity::Success);

        let sent = &store.calls().inserted[0][0];
        assert_eq!(sent.ptkey, key("P1"));
        assert_eq!(sent.fields.name, "Prednisolon");
    }

    #[tokio::test]
    async fn test_insert_empty_result_leaves_cache() {
        let (mut screen, store) = screen_with(vec![]);
        screen.load_patient(Some(key("P1"))).await;
        screen.add_draft();
        let before = screen.rows().to_vec();

        store.script(Scripted::Empty);
        assert_eq!(screen.save().await, SaveOutcome::NotApplied);

        assert_eq!(screen.rows(), before.as_slice());
        assert_eq!(save_toast(&screen).severity, Severity::Warning);
        assert_eq!(save_toast(&screen).message, NOT_ADDED);
        assert!(!screen.write_in_flight());
    }

    #[tokio::test]
    async fn test_insert_error_surfaces_message() {
        let (mut screen, store) = screen_with(vec![]);
        screen.load_patient(Some(key("P1"))).await;
        screen.add_draft();

        store.script(Scripted::Fail(StoreError::Backend {
            status: 409,
            message: r#"{"message":"duplicate key"}"#.into(),
        }));
        assert_eq!(screen.save().await, SaveOutcome::Failed);

        assert!(screen.cache().has_draft());
        assert_eq!(save_toast(&screen).severity, Severity::Error);
        assert_eq!(save_toast(&screen).message, r#"{"message":"duplicate key"}"#);
    }

    #[tokio::test]
    async fn test_update_merges_in_place() {
        let (mut screen, store) = screen_with(vec![
            record(1, "P1", "Insulin"),
            record(2, "P1", "Prednisolon"),
        ]);
        screen.load_patient(Some(key("P1"))).await;
        assert!(screen.row_selected(RowKey::Persisted(id(2))));
        screen.edit_form(|f| f.set_notes("with food"));

        assert_eq!(screen.save().await, SaveOutcome::Updated(id(2)));

        assert_eq!(screen.rows().len(), 2);
        assert_eq!(screen.rows()[1].fields().notes, "with food");
        assert_eq!(screen.form().unwrap().fields.notes, "with food");
        assert_eq!(screen.take_flashed(), vec![RowKey::Persisted(id(2))]);

        let (sent_id, patch) = &store.calls().updated[0];
        assert_eq!(*sent_id, id(2));
        assert_eq!(patch.notes, "with food");
    }

    #[tokio::test]
    async fn test_update_empty_result() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(1)));
        screen.edit_form(|f| f.set_notes("x"));

        store.script(Scripted::Empty);
        assert_eq!(screen.save().await, SaveOutcome::NotApplied);
        assert_eq!(save_toast(&screen).message, NOT_SAVED);
        assert_eq!(screen.rows()[0].fields().notes, "");
        // the form keeps the unsaved edit
        assert_eq!(screen.state(), &ScreenState::Editing { patient: key("P1") });
    }

    #[tokio::test]
    async fn test_update_skipped_when_form_belongs_to_other_row() {
        let (mut screen, store) = screen_with(vec![
            record(3, "P1", "Insulin"),
            record(7, "P1", "Prednisolon"),
        ]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(7)));
        let form = screen.form().cloned().unwrap();
        screen.row_selected(RowKey::Persisted(id(3)));
        screen.form = Some(form);

        assert_eq!(screen.save().await, SaveOutcome::Skipped);
        assert_eq!(store.calls().updates, 0);
    }

    #[tokio::test]
    async fn test_save_without_selection_is_skipped() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        assert_eq!(screen.save().await, SaveOutcome::Skipped);
        assert_eq!(store.calls().inserts + store.calls().updates, 0);
    }

    #[tokio::test]
    async fn test_second_save_while_outstanding_is_refused() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(1)));

        let first = screen.begin_save().unwrap();
        assert!(screen.write_in_flight());
        assert!(!screen.is_enabled(ToolbarAction::Save));
        assert_eq!(
            screen.dispatch(ToolbarAction::Save).await,
            ActionOutcome::Disabled
        );
        assert!(screen.begin_save().is_none());
        assert_eq!(store.calls().updates, 0);

        let result = first.call.send(store.as_ref()).await;
        assert_eq!(screen.finish_save(first.ticket, result), SaveOutcome::Updated(id(1)));
        assert!(screen.is_enabled(ToolbarAction::Save));
        assert_eq!(store.calls().updates, 1);
    }

    #[tokio::test]
    async fn test_save_survives_refresh_but_not_patient_switch() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(1)));
        screen.edit_form(|f| f.set_notes("late"));

        let request = screen.begin_save().unwrap();
        let result = request.call.send(store.as_ref()).await;
        screen.refresh().await;
        assert!(matches!(
            screen.finish_save(request.ticket, result),
            SaveOutcome::Updated(_)
        ));

        screen.row_selected(RowKey::Persisted(id(1)));
        screen.edit_form(|f| f.set_notes("later"));
        let request = screen.begin_save().unwrap();
        let result = request.call.send(store.as_ref()).await;
        screen.load_patient(Some(key("P2"))).await;
        assert_eq!(
            screen.finish_save(request.ticket, result),
            SaveOutcome::Stale
        );
        assert!(screen.rows().is_empty());
    }

    #[tokio::test]
    async fn test_patient_switch_clears_pending_write_toasts() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(1)));

        let request = screen.begin_save().unwrap();
        assert_eq!(
            screen.notifications().get(SAVE_TOAST).unwrap().severity,
            Severity::Loading
        );

        screen.load_patient(Some(key("P2"))).await;
        assert!(screen.notifications().get(SAVE_TOAST).is_none());
        assert!(screen.is_enabled(ToolbarAction::Save));

        let result = request.call.send(store.as_ref()).await;
        assert_eq!(screen.finish_save(request.ticket, result), SaveOutcome::Stale);
        assert!(screen.notifications().get(SAVE_TOAST).is_none());

        screen.import_mut().push(DrugFields::named("Insulin"));
        let rows = screen.import_mut().confirm();
        let _bulk = screen.begin_bulk_insert(rows).unwrap();
        assert_eq!(
            screen.notifications().get(IMPORT_TOAST).unwrap().severity,
            Severity::Loading
        );
        screen.select_patient(None);
        assert!(screen.notifications().get(IMPORT_TOAST).is_none());
    }

    #[tokio::test]
    async fn test_saving_state_tracks_outstanding_write() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(1)));

        // Refresh completes while the write is outstanding
        let request = screen.begin_save().unwrap();
        assert!(screen.state().is_saving());
        screen.refresh().await;
        assert_eq!(screen.state().is_saving(), screen.write_in_flight());
        assert!(screen.state().is_saving());

        let result = request.call.send(store.as_ref()).await;
        screen.finish_save(request.ticket, result);
        assert_eq!(screen.state(), &ScreenState::Loaded { patient: key("P1") });
        assert!(!screen.write_in_flight());

        // Refresh still outstanding when the write completes
        screen.row_selected(RowKey::Persisted(id(1)));
        let request = screen.begin_save().unwrap();
        let load = screen.begin_refresh().unwrap();
        assert!(screen.state().is_saving());

        let result = request.call.send(store.as_ref()).await;
        screen.finish_save(request.ticket, result);
        assert!(screen.state().is_loading());
        assert_eq!(screen.state().is_saving(), screen.write_in_flight());

        let rows = store.query(&key("P1")).await;
        assert_eq!(screen.finish_load(load, rows), LoadOutcome::Loaded(1));
        assert_eq!(screen.state(), &ScreenState::Loaded { patient: key("P1") });
    }

    #[tokio::test]
    async fn test_writes_refused_while_loading() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(1)));

        let _load = screen.begin_refresh().unwrap();
        assert!(screen.begin_save().is_none());
        assert!(!screen.write_in_flight());

        screen.import_mut().open();
        screen.import_mut().push(DrugFields::named("Insulin"));
        assert_eq!(screen.confirm_import().await, SaveOutcome::Skipped);
        assert_eq!(screen.import().rows().len(), 1);
        assert_eq!(store.calls().inserts + store.calls().updates, 0);
    }

    #[tokio::test]
    async fn test_bulk_insert_normalizes_dates() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;

        assert_eq!(
            screen.dispatch(ToolbarAction::AddMany).await,
            ActionOutcome::ModalOpened
        );
        screen
            .import_mut()
            .push(DrugFields::named("Insulin").with_time("2024-01-05"));
        screen
            .import_mut()
            .push(DrugFields::named("Prednisolon").with_time("2024-01-06"));

        assert_eq!(screen.confirm_import().await, SaveOutcome::Imported(2));

        assert!(!screen.import().is_visible());
        let sent = &store.calls().inserted[0];
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].fields.time, "2024-01-05 00:00:00");
        assert!(sent.iter().all(|r| r.ptkey == key("P1")));
        assert_eq!(screen.rows().len(), 3);
        assert_eq!(screen.take_flashed().len(), 2);
        assert_eq!(store.calls().inserts, 1);
    }

    #[tokio::test]
    async fn test_bulk_insert_error() {
        let (mut screen, store) = screen_with(vec![]);
        screen.load_patient(Some(key("P1"))).await;
        screen.import_mut().push(DrugFields::named("Insulin"));

        store.script(Scripted::Fail(StoreError::Timeout("30s".into())));
        assert_eq!(screen.confirm_import().await, SaveOutcome::Failed);
        assert!(screen.rows().is_empty());
        let toast = screen.notifications().get(IMPORT_TOAST).unwrap();
        assert_eq!(toast.severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_selection_copies_row_and_is_sticky() {
        let (mut screen, _) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;

        screen.row_selected(RowKey::Persisted(id(1)));
        assert_eq!(screen.form().unwrap().fields.name, "Insulin");
        assert!(!screen.try_deselect());
        assert!(screen.form().is_some());
    }

    #[tokio::test]
    async fn test_editing_back_to_original_returns_to_loaded() {
        let (mut screen, _) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        screen.row_selected(RowKey::Persisted(id(1)));

        screen.edit_form(|f| f.set_name("Other"));
        assert_eq!(screen.state(), &ScreenState::Editing { patient: key("P1") });
        screen.edit_form(|f| f.set_name("Insulin"));
        assert_eq!(screen.state(), &ScreenState::Loaded { patient: key("P1") });
    }

    #[tokio::test]
    async fn test_first_load_sizes_columns_to_fit() {
        let (mut screen, _) = screen_with(vec![record(1, "P1", "Insulin")]);
        screen.load_patient(Some(key("P1"))).await;
        assert_eq!(screen.columns().total_width(), screen.columns().viewport());
    }

    #[tokio::test]
    async fn test_follow_session() {
        let (mut screen, store) = screen_with(vec![record(1, "P1", "Insulin")]);
        let session = SessionContext::new();
        session.select_patient(Some(key("P1")));
        let rx = session.subscribe();
        drop(session);

        screen.follow(rx).await;

        assert_eq!(screen.patient(), Some(&key("P1")));
        assert_eq!(screen.rows().len(), 1);
        assert_eq!(store.calls().queries, 1);
    }
}
