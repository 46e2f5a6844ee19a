pub mod engine;
pub mod export;
pub mod state;

pub use engine::{ExportAck, SyncEngine, SyncFailure, SyncReport, WorklogExporter};
pub use export::{
    DEFAULT_INCREMENT, ExportRequest, export_comment, format_export_timestamp,
    round_up_to_increment, round_up_with, started_at,
};
pub use state::{SyncEvent, can_transition, transition};
