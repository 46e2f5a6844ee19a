// ============================================================================
// Sync State Machine
// ============================================================================
//
// Lifecycle of a record against the issue tracker:
//
//   pending ──ack──> synced
//      │               ^
//      └──fail──> error┘   (error ──fail──> error keeps retrying)
//
// `synced` is terminal. Edits to tracked fields never move the status.
//
// ============================================================================

use crate::core::{Result, WorklogError};
use crate::model::{SyncStatus, WorklogRecord};
use chrono::{DateTime, Utc};

/// Outcome of one export attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The tracker accepted the worklog and returned its id.
    Acknowledged(String),

    /// The export failed with a human-readable reason.
    Failed(String),
}

impl SyncEvent {
    pub fn target(&self) -> SyncStatus {
        match self {
            SyncEvent::Acknowledged(_) => SyncStatus::Synced,
            SyncEvent::Failed(_) => SyncStatus::Error,
        }
    }
}

/// Whether `from -> to` is a defined transition.
pub fn can_transition(from: SyncStatus, to: SyncStatus) -> bool {
    matches!(
        (from, to),
        (SyncStatus::Pending, SyncStatus::Synced)
            | (SyncStatus::Pending, SyncStatus::Error)
            | (SyncStatus::Error, SyncStatus::Synced)
            | (SyncStatus::Error, SyncStatus::Error)
    )
}

/// Applies `event` to `record`, keeping the sync fields consistent with the status.
pub fn transition(record: &mut WorklogRecord, event: SyncEvent, now: DateTime<Utc>) -> Result<()> {
    let from = record.sync_status;
    let to = event.target();
    if !can_transition(from, to) {
        return Err(WorklogError::InvalidTransition { from, to });
    }

    match event {
        SyncEvent::Acknowledged(external_worklog_id) => {
            if external_worklog_id.trim().is_empty() {
                return Err(WorklogError::InvalidInput(
                    "export acknowledgment carries no worklog id".to_string(),
                ));
            }
            record.sync_status = SyncStatus::Synced;
            record.synced_at = Some(now);
            record.external_worklog_id = Some(external_worklog_id);
            record.error_message = None;
        }
        SyncEvent::Failed(message) => {
            record.sync_status = SyncStatus::Error;
            record.error_message = Some(message);
        }
    }

    record.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewWorklog;

    fn pending() -> WorklogRecord {
        WorklogRecord::new(
            NewWorklog {
                task_id: "t".to_string(),
                external_key: Some("PROJ-7".to_string()),
                date: "2026-04-01".to_string(),
                start_time: "08:00".to_string(),
                end_time: "08:30".to_string(),
                duration_minutes: 30,
                description: String::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_pending_to_synced() {
        let mut record = pending();
        let now = Utc::now();
        transition(&mut record, SyncEvent::Acknowledged("EXT-1".to_string()), now).unwrap();

        assert_eq!(record.sync_status, SyncStatus::Synced);
        assert_eq!(record.synced_at, Some(now));
        assert_eq!(record.external_worklog_id.as_deref(), Some("EXT-1"));
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_pending_to_error_keeps_sync_fields_null() {
        let mut record = pending();
        transition(&mut record, SyncEvent::Failed("HTTP 500".to_string()), Utc::now()).unwrap();

        assert_eq!(record.sync_status, SyncStatus::Error);
        assert_eq!(record.error_message.as_deref(), Some("HTTP 500"));
        assert!(record.synced_at.is_none());
        assert!(record.external_worklog_id.is_none());
    }

    #[test]
    fn test_error_to_synced_clears_message() {
        let mut record = pending();
        transition(&mut record, SyncEvent::Failed("timeout".to_string()), Utc::now()).unwrap();
        transition(&mut record, SyncEvent::Acknowledged("EXT-2".to_string()), Utc::now()).unwrap();

        assert_eq!(record.sync_status, SyncStatus::Synced);
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_synced_is_terminal() {
        let mut record = pending();
        transition(&mut record, SyncEvent::Acknowledged("EXT-3".to_string()), Utc::now()).unwrap();
        let before = record.clone();

        let err = transition(&mut record, SyncEvent::Failed("x".to_string()), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            WorklogError::InvalidTransition { from: SyncStatus::Synced, to: SyncStatus::Error }
        ));
        assert!(transition(&mut record, SyncEvent::Acknowledged("EXT-4".to_string()), Utc::now()).is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn test_ack_without_id_is_rejected() {
        let mut record = pending();
        let result = transition(&mut record, SyncEvent::Acknowledged("  ".to_string()), Utc::now());
        assert!(matches!(result, Err(WorklogError::InvalidInput(_))));
        assert_eq!(record.sync_status, SyncStatus::Pending);
    }

    #[test]
    fn test_transition_table() {
        assert!(can_transition(SyncStatus::Pending, SyncStatus::Synced));
        assert!(can_transition(SyncStatus::Error, SyncStatus::Error));
        assert!(!can_transition(SyncStatus::Synced, SyncStatus::Pending));
        assert!(!can_transition(SyncStatus::Error, SyncStatus::Pending));
        assert!(!can_transition(SyncStatus::Pending, SyncStatus::Pending));
    }
}
