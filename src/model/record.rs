use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Synchronization state of a record against the issue tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Pending,
    Synced,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked time entry.
///
/// `date` is an ISO `YYYY-MM-DD` string and is compared lexically.
/// `duration_minutes` is supplied by the caller and never derived from the
/// start/end times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogRecord {
    pub id: String,
    pub task_id: String,
    pub external_key: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
    pub description: String,
    pub sync_status: SyncStatus,
    pub synced_at: Option<DateTime<Utc>>,
    pub external_worklog_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorklogRecord {
    /// Builds a fresh `pending` record with a new id.
    pub fn new(input: NewWorklog, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: input.task_id,
            external_key: input.external_key,
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            duration_minutes: input.duration_minutes,
            description: input.description,
            sync_status: SyncStatus::Pending,
            synced_at: None,
            external_worklog_id: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields over this record and refreshes `updated_at`.
    ///
    /// Sync fields are not part of a patch; they only move through
    /// [`crate::sync::transition`].
    pub fn apply_patch(&mut self, patch: WorklogPatch, now: DateTime<Utc>) {
        if let Some(task_id) = patch.task_id {
            self.task_id = task_id;
        }
        if let Some(external_key) = patch.external_key {
            self.external_key = external_key;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            self.duration_minutes = duration_minutes;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        self.updated_at = now;
    }

    /// A record can be exported once it points at a ticket and carries time.
    pub fn is_exportable(&self) -> bool {
        self.external_key.as_deref().is_some_and(|key| !key.trim().is_empty())
            && self.duration_minutes > 0
    }
}

/// Caller-supplied fields for a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorklog {
    pub task_id: String,
    #[serde(default)]
    pub external_key: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: String,
}

/// Partial update of a record's tracked fields.
///
/// `external_key` is doubly optional: `None` leaves it untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorklogPatch {
    pub task_id: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    pub external_key: Option<Option<String>>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration_minutes: Option<u32>,
    pub description: Option<String>,
}

// A present JSON key, even `null`, becomes `Some(..)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
