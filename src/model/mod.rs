pub mod container;
pub mod record;

pub use container::{CONTAINER_VERSION, WorklogContainer};
pub use record::{NewWorklog, SyncStatus, WorklogPatch, WorklogRecord};
