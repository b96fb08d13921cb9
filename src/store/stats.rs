//! Store Statistics Module
//!
//! Tracks hits, misses and backend errors. Counters are atomic because the
//! store facade is shared by value across many concurrent tasks.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Store Stats ==
/// Live counters, updated lock-free from any task holding the store.
#[derive(Debug, Default)]
pub struct StoreStats {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of the counters, for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Reads that found a live value
    pub hits: u64,
    /// Reads that found nothing (absent or expired)
    pub misses: u64,
    /// Backend or decode failures absorbed by fail-open handling
    pub errors: u64,
    /// hits / (hits + misses), 0.0 with no reads
    pub hit_rate: f64,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        StatsSnapshot {
            hits,
            misses,
            errors,
            hit_rate,
        }
    }
}
