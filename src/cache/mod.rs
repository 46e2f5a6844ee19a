pub mod ttl;

pub use ttl::{DEFAULT_CAPACITY, DEFAULT_TTL, TtlCache};
