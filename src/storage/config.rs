use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};

/// File name of the container inside a data directory.
pub const STORE_FILE_NAME: &str = "worklogs.json";

/// Backup folder, relative to the data directory.
pub const BACKUP_SUBDIR: &str = "backups/worklogs";

/// Number of backups kept by default.
pub const DEFAULT_BACKUP_RETENTION: usize = 10;

/// Worklog store configuration
///
/// Paths are always explicit; there is no process-wide default location.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Container file
    pub store_path: PathBuf,

    /// Folder receiving timestamped copies of the container
    pub backup_dir: PathBuf,

    /// How many backups survive rotation
    pub backup_retention: usize,

    /// Read cache TTL, `None` disables the cache
    pub cache_ttl: Option<Duration>,

    /// Read cache capacity
    pub cache_capacity: usize,
}

impl StoreConfig {
    /// Lay the store out inside `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self::with_paths(data_dir.join(STORE_FILE_NAME), data_dir.join(BACKUP_SUBDIR))
    }

    /// Use explicit container and backup locations
    pub fn with_paths(store_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            backup_dir: backup_dir.into(),
            backup_retention: DEFAULT_BACKUP_RETENTION,
            cache_ttl: Some(DEFAULT_TTL),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Set backup retention
    pub fn backup_retention(mut self, keep: usize) -> Self {
        self.backup_retention = keep;
        self
    }

    /// Set read cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set read cache capacity
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Disable the read cache
    pub fn without_cache(mut self) -> Self {
        self.cache_ttl = None;
        self
    }
}
