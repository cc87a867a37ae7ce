//! Cache observability counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub fetches: AtomicU64,
}

impl Counters {
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.fetches.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time snapshot of the mapping cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub hits: u64,
    pub misses: u64,
    /// Outbound fetch attempts, successful or not.
    pub fetches: u64,
    pub cached_registries: usize,
    pub in_flight: usize,
}
