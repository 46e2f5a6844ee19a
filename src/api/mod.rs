pub mod envelope;
pub mod service;

pub use envelope::Envelope;
pub use service::WorklogService;
