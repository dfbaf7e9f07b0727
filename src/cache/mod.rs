// =============================================================================
// Response cache
// =============================================================================

pub mod staleness;
pub mod store;

pub use staleness::StalenessCache;
pub use store::{CacheStore, FileStore, MemoryStore};
