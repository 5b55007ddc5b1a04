//! Cache Module
//!
//! Provides in-memory caching with reader-supplied TTLs and capacity-bounded
//! eviction of the oldest entries.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Capacity used when none is configured
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// A full cache evicts `len / EVICTION_DIVISOR` entries (at least one)
pub const EVICTION_DIVISOR: usize = 10;
