//! Metrics for selector operations

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-selector counters
#[derive(Debug, Default)]
pub struct SelectorMetrics {
    /// `get` calls answered from the cache
    pub cache_hits: AtomicU64,
    /// `get` calls that ran the execute function
    pub cache_misses: AtomicU64,
    /// Cache clears (explicit or via invalidation)
    pub invalidations: AtomicU64,
    /// Listener notification rounds
    pub notifications: AtomicU64,
    /// Notification rounds skipped because the selector was already notifying
    pub suppressed_notifications: AtomicU64,
}

impl SelectorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.suppressed_notifications.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> SelectorMetricsSnapshot {
        SelectorMetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            suppressed_notifications: self.suppressed_notifications.load(Ordering::Relaxed),
        }
    }

    /// Fraction of `get` calls served from cache
    pub fn hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let total = hits + self.cache_misses.load(Ordering::Relaxed);
        if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Point-in-time copy of [`SelectorMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectorMetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub invalidations: u64,
    pub notifications: u64,
    pub suppressed_notifications: u64,
}
