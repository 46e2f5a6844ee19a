pub mod backup;
pub mod config;
pub mod persistence;
pub mod store;

pub use backup::{BackupEntry, BackupManager};
pub use config::StoreConfig;
pub use store::{WorklogStats, WorklogStore};
