//! Cache Entry Module
//!
//! Defines a single stored value stamped with its write time.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and write instant.
///
/// The entry carries no TTL of its own; freshness is decided by the reader.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value was written
    pub created_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped at `now`.
    pub fn new(value: V, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
        }
    }

    // == Age ==
    /// Time elapsed between the write and `now` (zero if `now` is earlier).
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Fresh ==
    /// Checks whether the entry is still fresh for a reader using `ttl`.
    ///
    /// Boundary condition: an entry is fresh only while its age is strictly
    /// less than the TTL, so a zero TTL never yields a fresh entry.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) < ttl
    }
}
