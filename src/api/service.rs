use crate::api::envelope::Envelope;
use crate::core::Result;
use crate::model::{NewWorklog, WorklogContainer, WorklogPatch, WorklogRecord};
use crate::storage::{StoreConfig, WorklogStats, WorklogStore};
use std::path::PathBuf;
use std::sync::Mutex;

/// Boundary exposed to the UI/CLI layer.
///
/// Wraps the store in a mutex so at most one operation touches the
/// container at a time, and turns every outcome into an [`Envelope`].
pub struct WorklogService {
    store: Mutex<WorklogStore>,
}

impl WorklogService {
    pub fn new(store: WorklogStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub fn open(config: &StoreConfig) -> Self {
        Self::new(WorklogStore::open(config))
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut WorklogStore) -> Result<T>) -> Result<T> {
        let mut store = self.store.lock()?;
        f(&mut store)
    }

    /// Full id of the record matching `id_or_prefix`.
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String> {
        self.with_store(|store| store.get(id_or_prefix).map(|record| record.id))
    }

    pub fn ensure_initialized(&self) -> Envelope<()> {
        self.with_store(|store| store.ensure_initialized()).into()
    }

    pub fn list_all(&self) -> Envelope<WorklogContainer> {
        self.with_store(|store| store.list_all()).into()
    }

    pub fn list_by_date(&self, date: &str) -> Envelope<Vec<WorklogRecord>> {
        self.with_store(|store| store.list_by_date(date)).into()
    }

    pub fn list_by_range(&self, start_date: &str, end_date: &str) -> Envelope<Vec<WorklogRecord>> {
        self.with_store(|store| store.list_by_range(start_date, end_date))
            .into()
    }

    pub fn list_pending(&self) -> Envelope<Vec<WorklogRecord>> {
        self.with_store(|store| store.list_pending()).into()
    }

    pub fn get(&self, id_or_prefix: &str) -> Envelope<WorklogRecord> {
        self.with_store(|store| store.get(id_or_prefix)).into()
    }

    pub fn add(&self, input: NewWorklog) -> Envelope<WorklogRecord> {
        self.with_store(|store| store.add(input)).into()
    }

    pub fn update(&self, id: &str, patch: WorklogPatch) -> Envelope<WorklogRecord> {
        self.with_store(|store| store.update(id, patch)).into()
    }

    pub fn delete(&self, id: &str) -> Envelope<()> {
        self.with_store(|store| store.delete(id)).into()
    }

    pub fn mark_synced(&self, id: &str, external_worklog_id: &str) -> Envelope<WorklogRecord> {
        self.with_store(|store| store.mark_synced(id, external_worklog_id))
            .into()
    }

    pub fn mark_error(&self, id: &str, message: &str) -> Envelope<WorklogRecord> {
        self.with_store(|store| store.mark_error(id, message)).into()
    }

    pub fn stats(&self) -> Envelope<WorklogStats> {
        self.with_store(|store| store.stats()).into()
    }

    pub fn store_path(&self) -> Envelope<PathBuf> {
        self.with_store(|store| Ok(store.path().to_path_buf())).into()
    }
}
