use thiserror::Error;

use crate::model::SyncStatus;

#[derive(Error, Debug)]
pub enum WorklogError {
    #[error("Failed to read worklog store: {0}")]
    ReadFailure(String),

    #[error("Failed to write worklog store: {0}")]
    WriteFailure(String),

    #[error("Worklog '{0}' not found")]
    NotFound(String),

    #[error("Worklog id '{0}' is ambiguous, use a longer prefix")]
    AmbiguousId(String),

    #[error("Invalid sync transition: {from} -> {to}")]
    InvalidTransition { from: SyncStatus, to: SyncStatus },

    #[error("Backup failed: {0}")]
    BackupFailure(String),

    #[error("Export failed: {0}")]
    ExportFailure(String),

    #[error("Export already in flight for worklog '{0}'")]
    ExportInFlight(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, WorklogError>;

impl<T> From<std::sync::PoisonError<T>> for WorklogError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
