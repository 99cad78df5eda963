//! Metrics for broker operations
//!
//! Thread-safe counters covering subscriptions, publishes, per-recipient
//! delivery outcomes and origin rejections.

use crate::domain::DeliveryOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the message broker
#[derive(Debug, Default)]
pub struct BrokerMetrics {
    /// Successful subscribe calls (including replacements)
    pub subscriptions: AtomicU64,
    /// Unsubscribe calls that removed a client
    pub unsubscriptions: AtomicU64,
    /// Publish calls that reached delivery
    pub messages_published: AtomicU64,
    /// Recipients whose handler settled successfully
    pub deliveries_succeeded: AtomicU64,
    /// Recipients whose handler failed, panicked or timed out
    pub deliveries_failed: AtomicU64,
    /// Targets that were not subscribed to the channel
    pub deliveries_skipped: AtomicU64,
    /// Inbound envelopes dropped at the origin gate
    pub origin_rejections: AtomicU64,
}

impl BrokerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_subscribe(&self) {
        self.subscriptions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsubscribe(&self) {
        self.unsubscriptions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish(&self) {
        self.messages_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one delivery
    pub fn record_outcome(&self, outcome: &DeliveryOutcome) {
        let counter = match outcome {
            DeliveryOutcome::Delivered(_) => &self.deliveries_succeeded,
            DeliveryOutcome::Failed(_) => &self.deliveries_failed,
            DeliveryOutcome::NotDelivered => &self.deliveries_skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_origin_rejected(&self) {
        self.origin_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> BrokerMetricsSnapshot {
        BrokerMetricsSnapshot {
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
            unsubscriptions: self.unsubscriptions.load(Ordering::Relaxed),
            messages_published: self.messages_published.load(Ordering::Relaxed),
            deliveries_succeeded: self.deliveries_succeeded.load(Ordering::Relaxed),
            deliveries_failed: self.deliveries_failed.load(Ordering::Relaxed),
            deliveries_skipped: self.deliveries_skipped.load(Ordering::Relaxed),
            origin_rejections: self.origin_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`BrokerMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerMetricsSnapshot {
    pub subscriptions: u64,
    pub unsubscriptions: u64,
    pub messages_published: u64,
    pub deliveries_succeeded: u64,
    pub deliveries_failed: u64,
    pub deliveries_skipped: u64,
    pub origin_rejections: u64,
}
