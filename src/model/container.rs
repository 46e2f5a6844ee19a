use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{SyncStatus, WorklogRecord};

/// Current container format tag.
pub const CONTAINER_VERSION: &str = "1.0";

/// The persisted document: a version tag plus records in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogContainer {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub worklogs: Vec<WorklogRecord>,
}

impl Default for WorklogContainer {
    fn default() -> Self {
        Self {
            version: CONTAINER_VERSION.to_string(),
            updated_at: None,
            worklogs: Vec::new(),
        }
    }
}

impl WorklogContainer {
    pub fn len(&self) -> usize {
        self.worklogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worklogs.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.worklogs.iter().position(|w| w.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&WorklogRecord> {
        self.worklogs.iter().find(|w| w.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut WorklogRecord> {
        self.worklogs.iter_mut().find(|w| w.id == id)
    }

    pub fn by_date(&self, date: &str) -> Vec<WorklogRecord> {
        self.filtered(|w| w.date == date)
    }

    /// Inclusive on both ends, ISO dates compare lexically.
    pub fn by_range(&self, start_date: &str, end_date: &str) -> Vec<WorklogRecord> {
        self.filtered(|w| start_date <= w.date.as_str() && w.date.as_str() <= end_date)
    }

    pub fn by_status(&self, status: SyncStatus) -> Vec<WorklogRecord> {
        self.filtered(|w| w.sync_status == status)
    }

    fn filtered(&self, predicate: impl Fn(&WorklogRecord) -> bool) -> Vec<WorklogRecord> {
        self.worklogs.iter().filter(|w| predicate(*w)).cloned().collect()
    }
}
