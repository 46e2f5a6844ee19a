// ============================================================================
// Worklog Store Library
// ============================================================================

pub mod api;
pub mod cache;
pub mod core;
pub mod model;
pub mod storage;
pub mod sync;

// Re-export main types for convenience
pub use api::{Envelope, WorklogService};
pub use cache::TtlCache;
pub use core::{Result, WorklogError};
pub use model::{NewWorklog, SyncStatus, WorklogContainer, WorklogPatch, WorklogRecord};
pub use storage::{BackupManager, StoreConfig, WorklogStats, WorklogStore};
pub use sync::{
    ExportAck, ExportRequest, SyncEngine, SyncReport, WorklogExporter, format_export_timestamp,
    round_up_to_increment,
};

/// Opens the worklog store laid out inside `data_dir`.
///
/// # Examples
///
/// ```no_run
/// use worklog_store::{NewWorklog, open};
///
/// let service = open("/var/lib/worklogs");
/// let added = service.add(NewWorklog {
///     task_id: "task-1".to_string(),
///     external_key: Some("PROJ-12".to_string()),
///     date: "2026-03-02".to_string(),
///     start_time: "09:00".to_string(),
///     end_time: "09:45".to_string(),
///     duration_minutes: 45,
///     description: "Code review".to_string(),
/// });
/// assert!(added.success);
/// ```
pub fn open(data_dir: impl AsRef<std::path::Path>) -> WorklogService {
    WorklogService::open(&StoreConfig::new(data_dir))
}
