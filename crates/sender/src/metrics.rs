//! Sender metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one sender's lifetime
#[derive(Debug, Default)]
pub struct SenderMetrics {
    /// Dispatch cycles started
    ticks: AtomicU64,
    /// Groups handed to delivery tasks
    groups_dispatched: AtomicU64,
    /// Agreement messages sent successfully
    agreements_sent: AtomicU64,
    /// Records deleted during reconciliation
    records_deleted: AtomicU64,
    /// Delivery tasks that aborted before receiving a summary
    deliveries_failed: AtomicU64,
}

impl SenderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn inc_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn groups_dispatched(&self) -> u64 {
        self.groups_dispatched.load(Ordering::Relaxed)
    }

    pub fn inc_groups_dispatched(&self) {
        self.groups_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn agreements_sent(&self) -> u64 {
        self.agreements_sent.load(Ordering::Relaxed)
    }

    pub fn inc_agreements_sent(&self) {
        self.agreements_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_deleted(&self) -> u64 {
        self.records_deleted.load(Ordering::Relaxed)
    }

    pub fn inc_records_deleted(&self) {
        self.records_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn deliveries_failed(&self) -> u64 {
        self.deliveries_failed.load(Ordering::Relaxed)
    }

    pub fn inc_deliveries_failed(&self) {
        self.deliveries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> SenderMetricsSnapshot {
        SenderMetricsSnapshot {
            ticks: self.ticks(),
            groups_dispatched: self.groups_dispatched(),
            agreements_sent: self.agreements_sent(),
            records_deleted: self.records_deleted(),
            deliveries_failed: self.deliveries_failed(),
        }
    }
}

/// Snapshot of sender metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct SenderMetricsSnapshot {
    pub ticks: u64,
    pub groups_dispatched: u64,
    pub agreements_sent: u64,
    pub records_deleted: u64,
    pub deliveries_failed: u64,
}
