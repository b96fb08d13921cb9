//! Store Module
//!
//! TTL key-value store: a typed facade over interchangeable backends,
//! with atomic counters, batch operations and glob key enumeration.

mod backend;
mod entry;
mod memory;
mod remote;
mod stats;
#[allow(clippy::module_inception)]
mod store;


// Re-export public types
pub use backend::StoreBackend;
pub use entry::{ms_to_secs_ceil, now_ms, KeyTtl, StoredEntry};
pub use memory::MemoryBackend;
pub use remote::RedisBackend;
pub use stats::{StatsSnapshot, StoreStats};
pub use store::Store;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
