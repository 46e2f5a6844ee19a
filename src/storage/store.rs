use crate::cache::TtlCache;
use crate::core::{Result, WorklogError};
use crate::model::{NewWorklog, SyncStatus, WorklogContainer, WorklogPatch, WorklogRecord};
use crate::storage::backup::BackupManager;
use crate::storage::config::StoreConfig;
use crate::storage::persistence::{load_container, save_container};
use crate::sync::{SyncEvent, round_up_to_increment, transition};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable single-file store of worklog records.
///
/// Every mutation runs the same sequence: ensure the file exists, take a
/// best-effort backup, read the whole container, mutate it in memory, write
/// it back atomically, drop cached reads. Callers must serialize mutations;
/// see [`crate::api::WorklogService`] for a locked wrapper.
pub struct WorklogStore {
    path: PathBuf,
    backups: BackupManager,
    cache: Option<TtlCache<PathBuf, WorklogContainer>>,
}

/// Aggregate figures over the whole container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogStats {
    pub total: usize,
    pub pending: usize,
    pub synced: usize,
    pub error: usize,
    pub total_minutes: u64,
    pub rounded_minutes: u64,
    pub exportable: usize,
}

impl WorklogStore {
    pub fn open(config: &StoreConfig) -> Self {
        let cache = config
            .cache_ttl
            .map(|ttl| TtlCache::with_capacity(ttl, config.cache_capacity));

        Self {
            path: config.store_path.clone(),
            backups: BackupManager::new(
                config.store_path.clone(),
                config.backup_dir.clone(),
                config.backup_retention,
            ),
            cache,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Creates an empty `1.0` container if the file is absent.
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        save_container(&self.path, &WorklogContainer::default())?;
        info!(path = %self.path.display(), "initialized worklog store");
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn list_all(&mut self) -> Result<WorklogContainer> {
        if let Some(cache) = self.cache.as_mut() {
            if let Some(cached) = cache.get(&self.path) {
                return Ok(cached);
            }
        }

        let container = load_container(&self.path)?.unwrap_or_default();
        if let Some(cache) = self.cache.as_mut() {
            cache.set(self.path.clone(), container.clone());
        }
        Ok(container)
    }

    pub fn list_by_date(&mut self, date: &str) -> Result<Vec<WorklogRecord>> {
        Ok(self.list_all()?.by_date(date))
    }

    pub fn list_by_range(&mut self, start_date: &str, end_date: &str) -> Result<Vec<WorklogRecord>> {
        Ok(self.list_all()?.by_range(start_date, end_date))
    }

    pub fn list_pending(&mut self) -> Result<Vec<WorklogRecord>> {
        Ok(self.list_all()?.by_status(SyncStatus::Pending))
    }

    /// Resolves an exact id, or failing that a unique id prefix.
    pub fn get(&mut self, id_or_prefix: &str) -> Result<WorklogRecord> {
        let container = self.list_all()?;
        if let Some(record) = container.find(id_or_prefix) {
            return Ok(record.clone());
        }

        if id_or_prefix.is_empty() {
            return Err(WorklogError::NotFound(String::new()));
        }

        let mut matches = container
            .worklogs
            .iter()
            .filter(|w| w.id.starts_with(id_or_prefix));

        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record.clone()),
            (Some(_), Some(_)) => Err(WorklogError::AmbiguousId(id_or_prefix.to_string())),
            (None, _) => Err(WorklogError::NotFound(id_or_prefix.to_string())),
        }
    }

    pub fn stats(&mut self) -> Result<WorklogStats> {
        let container = self.list_all()?;
        let mut stats = WorklogStats {
            total: container.len(),
            ..Default::default()
        };

        for record in &container.worklogs {
            match record.sync_status {
                SyncStatus::Pending => stats.pending += 1,
                SyncStatus::Synced => stats.synced += 1,
                SyncStatus::Error => stats.error += 1,
            }
            stats.total_minutes += u64::from(record.duration_minutes);
            stats.rounded_minutes += u64::from(round_up_to_increment(record.duration_minutes));
            if record.is_exportable() && record.sync_status != SyncStatus::Synced {
                stats.exportable += 1;
            }
        }
        Ok(stats)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn add(&mut self, input: NewWorklog) -> Result<WorklogRecord> {
        let record = self.mutate(|container| {
            let record = WorklogRecord::new(input, Utc::now());
            container.worklogs.push(record.clone());
            Ok(record)
        })?;
        debug!(id = %record.id, date = %record.date, "worklog added");
        Ok(record)
    }

    pub fn update(&mut self, id: &str, patch: WorklogPatch) -> Result<WorklogRecord> {
        self.mutate(|container| {
            let record = container
                .find_mut(id)
                .ok_or_else(|| WorklogError::NotFound(id.to_string()))?;
            record.apply_patch(patch, Utc::now());
            Ok(record.clone())
        })
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.mutate(|container| {
            // Resolve the index against the container just read, never a cached one.
            let index = container
                .position(id)
                .ok_or_else(|| WorklogError::NotFound(id.to_string()))?;
            container.worklogs.remove(index);
            Ok(())
        })?;
        debug!(id, "worklog deleted");
        Ok(())
    }

    pub fn mark_synced(&mut self, id: &str, external_worklog_id: &str) -> Result<WorklogRecord> {
        let event = SyncEvent::Acknowledged(external_worklog_id.to_string());
        let record = self.apply_sync_event(id, event)?;
        info!(id, external_worklog_id, "worklog synced");
        Ok(record)
    }

    pub fn mark_error(&mut self, id: &str, message: &str) -> Result<WorklogRecord> {
        let record = self.apply_sync_event(id, SyncEvent::Failed(message.to_string()))?;
        info!(id, error = message, "worklog sync failed");
        Ok(record)
    }

    fn apply_sync_event(&mut self, id: &str, event: SyncEvent) -> Result<WorklogRecord> {
        self.mutate(|container| {
            let record = container
                .find_mut(id)
                .ok_or_else(|| WorklogError::NotFound(id.to_string()))?;
            transition(record, event, Utc::now())?;
            Ok(record.clone())
        })
    }

    fn mutate<T>(&mut self, apply: impl FnOnce(&mut WorklogContainer) -> Result<T>) -> Result<T> {
        self.ensure_initialized()?;
        self.backups.create_backup();

        let mut container = load_container(&self.path)?.unwrap_or_default();
        let result = apply(&mut container)?;

        container.updated_at = Some(Utc::now());
        save_container(&self.path, &container)?;

        if let Some(cache) = self.cache.as_mut() {
            cache.invalidate(&self.path);
        }
        Ok(result)
    }
}
