//! Timestamped snapshots of the container file with bounded retention.
//!
//! A copy is taken before every mutation. Backups are advisory: any failure
//! here is logged and swallowed so the mutation itself always proceeds.

use crate::core::{Result, WorklogError};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// File name prefix of every backup.
pub const BACKUP_PREFIX: &str = "worklogs_";

/// File name suffix of every backup.
pub const BACKUP_SUFFIX: &str = ".json";

// Suffixes stay three digits wide so names sort lexically.
const MAX_COLLISION_SUFFIX: u32 = 999;

/// One backup file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
}

pub struct BackupManager {
    source: PathBuf,
    backup_dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(source: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            source: source.into(),
            backup_dir: backup_dir.into(),
            retention,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copies the live file into the backup folder and rotates old copies.
    ///
    /// Returns the new backup path, or `None` when there was nothing to copy
    /// or the copy failed.
    pub fn create_backup(&self) -> Option<PathBuf> {
        match self.try_create_backup() {
            Ok(Some(path)) => {
                debug!(backup = %path.display(), "worklog backup created");
                self.cleanup_old_backups();
                Some(path)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, source = %self.source.display(), "worklog backup failed");
                None
            }
        }
    }

    fn try_create_backup(&self) -> Result<Option<PathBuf>> {
        if !self.source.exists() {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            WorklogError::BackupFailure(format!(
                "create backup dir {}: {}",
                self.backup_dir.display(),
                e
            ))
        })?;

        let target = self.next_backup_path()?;
        fs::copy(&self.source, &target).map_err(|e| {
            WorklogError::BackupFailure(format!("copy to {}: {}", target.display(), e))
        })?;

        Ok(Some(target))
    }

    /// Name derived from the capture time; a three-digit suffix resolves
    /// collisions within the same millisecond while keeping names sortable.
    fn next_backup_path(&self) -> Result<PathBuf> {
        self.next_backup_path_for(&backup_timestamp())
    }

    fn next_backup_path_for(&self, stamp: &str) -> Result<PathBuf> {
        let candidate = self
            .backup_dir
            .join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_SUFFIX}"));
        if !candidate.exists() {
            return Ok(candidate);
        }

        (1..=MAX_COLLISION_SUFFIX)
            .map(|counter| {
                self.backup_dir
                    .join(format!("{BACKUP_PREFIX}{stamp}_{counter:03}{BACKUP_SUFFIX}"))
            })
            .find(|candidate| !candidate.exists())
            .ok_or_else(|| {
                WorklogError::BackupFailure(format!("too many backups named {}", stamp))
            })
    }

    /// Deletes every backup beyond the `retention` most recent.
    ///
    /// Returns how many files were removed. Failures are logged, not returned.
    pub fn cleanup_old_backups(&self) -> usize {
        let entries = match self.list_backups() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "listing worklog backups failed");
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.iter().skip(self.retention) {
            match fs::remove_file(&entry.path) {
                Ok(()) => removed += 1,
                Err(err) => {
                    warn!(error = %err, backup = %entry.path.display(), "removing old worklog backup failed");
                }
            }
        }

        if removed > 0 {
            debug!(removed, kept = self.retention, "rotated worklog backups");
        }
        removed
    }

    /// Backups newest first, by modification time then by name.
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>> {
        let read_dir = match fs::read_dir(&self.backup_dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(WorklogError::BackupFailure(format!(
                    "read backup dir {}: {}",
                    self.backup_dir.display(),
                    e
                )));
            }
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir.flatten() {
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if !is_backup_name(&name) {
                continue;
            }
            let Ok(metadata) = dir_entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            entries.push(BackupEntry {
                path: dir_entry.path(),
                name,
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }
}

fn is_backup_name(name: &str) -> bool {
    name.len() > BACKUP_PREFIX.len() + BACKUP_SUFFIX.len()
        && name.starts_with(BACKUP_PREFIX)
        && name.ends_with(BACKUP_SUFFIX)
}

/// `2026-10-16T08:30:00.123Z` becomes `2026-10-16T08-30-00-123Z`.
fn backup_timestamp() -> String {
    Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}
