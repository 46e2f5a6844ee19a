use crate::api::WorklogService;
use crate::core::{Result, WorklogError};
use crate::model::{SyncStatus, WorklogRecord};
use crate::sync::export::ExportRequest;
use async_trait::async_trait;
use chrono::{FixedOffset, Local};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Acknowledgment returned by the tracker for an accepted worklog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportAck {
    pub worklog_id: String,
}

impl ExportAck {
    pub fn new(worklog_id: impl Into<String>) -> Self {
        Self {
            worklog_id: worklog_id.into(),
        }
    }
}

/// The issue tracker's worklog API, as seen from the store.
///
/// Implementations own transport, credentials and retries; a failure is
/// reported as a human-readable message.
#[async_trait]
pub trait WorklogExporter: Send + Sync {
    async fn export(&self, request: &ExportRequest) -> std::result::Result<ExportAck, String>;
}

#[async_trait]
impl<E: WorklogExporter + ?Sized> WorklogExporter for Arc<E> {
    async fn export(&self, request: &ExportRequest) -> std::result::Result<ExportAck, String> {
        (**self).export(request).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub id: String,
    pub message: String,
}

/// Result of one [`SyncEngine::sync_pending`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub failed: Vec<SyncFailure>,
    pub skipped: Vec<SyncFailure>,
}

/// Drives exports and applies their outcome to the store.
///
/// The exporter is awaited without holding the store lock. A record is never
/// exported twice concurrently.
pub struct SyncEngine<E> {
    service: Arc<WorklogService>,
    exporter: E,
    offset: Option<FixedOffset>,
    in_flight: Mutex<HashSet<String>>,
}

impl<E: WorklogExporter> SyncEngine<E> {
    /// Start timestamps use the local time zone, resolved for each record's date.
    pub fn new(service: Arc<WorklogService>, exporter: E) -> Self {
        Self {
            service,
            exporter,
            offset: None,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Pins every start timestamp to `offset` instead of the local time zone.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Exports one record and records the outcome.
    ///
    /// A rejected export still succeeds at the store level: the record moves
    /// to `error` and the call returns [`WorklogError::ExportFailure`].
    pub async fn export_one(&self, id: &str) -> Result<WorklogRecord> {
        let id = self.service.with_store(|store| store.get(id))?.id;
        let _guard = InFlight::acquire(&self.in_flight, &id)?;

        // Re-read under the guard: a concurrent export may have just finished.
        let record = self.service.with_store(|store| store.get(&id))?;
        if record.sync_status == SyncStatus::Synced {
            return Err(WorklogError::InvalidTransition {
                from: SyncStatus::Synced,
                to: SyncStatus::Synced,
            });
        }

        let request = match self.offset {
            Some(offset) => ExportRequest::for_record(&record, &offset)?,
            None => ExportRequest::for_record(&record, &Local)?,
        };

        debug!(
            id = %record.id,
            key = %request.external_key,
            seconds = request.time_spent_seconds,
            "exporting worklog"
        );

        let message = match self.exporter.export(&request).await {
            Ok(ack) if !ack.worklog_id.trim().is_empty() => {
                return self
                    .service
                    .with_store(|store| store.mark_synced(&record.id, &ack.worklog_id));
            }
            Ok(_) => "export acknowledgment carries no worklog id".to_string(),
            Err(message) => message,
        };

        warn!(id = %record.id, error = %message, "worklog export failed");
        self.service
            .with_store(|store| store.mark_error(&record.id, &message))?;
        Err(WorklogError::ExportFailure(message))
    }

    /// Exports every `pending` or `error` record that has a key and tracked time,
    /// one at a time, in container order.
    pub async fn sync_pending(&self) -> Result<SyncReport> {
        let candidates: Vec<WorklogRecord> = self.service.with_store(|store| {
            Ok(store
                .list_all()?
                .worklogs
                .into_iter()
                .filter(|w| w.sync_status != SyncStatus::Synced)
                .collect())
        })?;

        let mut report = SyncReport::default();
        for record in candidates {
            if !record.is_exportable() {
                report.skipped.push(SyncFailure {
                    id: record.id,
                    message: "missing external key or tracked time".to_string(),
                });
                continue;
            }

            match self.export_one(&record.id).await {
                Ok(synced) => report.synced.push(synced.id),
                Err(WorklogError::ExportFailure(message)) => report.failed.push(SyncFailure {
                    id: record.id,
                    message,
                }),
                Err(err @ (WorklogError::InvalidInput(_)
                | WorklogError::NotFound(_)
                | WorklogError::InvalidTransition { .. }
                | WorklogError::ExportInFlight(_))) => {
                    report.skipped.push(SyncFailure {
                        id: record.id,
                        message: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            synced = report.synced.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "worklog sync pass finished"
        );
        Ok(report)
    }
}

/// Marks a record as being exported until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<String>>, id: &str) -> Result<Self> {
        if !set.lock()?.insert(id.to_string()) {
            return Err(WorklogError::ExportInFlight(id.to_string()));
        }
        Ok(Self {
            set,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.id);
        }
    }
}
