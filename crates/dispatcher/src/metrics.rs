//! Dispatch metrics for the run summary

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the dispatch worker and whoever reports on it
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Payloads taken off the queue
    received: AtomicU64,
    /// Successful manager updates
    dispatched: AtomicU64,
    /// Payloads the normalizer rejected
    unrecognized: AtomicU64,
    /// Manager updates that returned an error or panicked
    sink_failures: AtomicU64,
    /// Times the queue depth exceeded the threshold
    backpressure_warnings: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn inc_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unrecognized(&self) -> u64 {
        self.unrecognized.load(Ordering::Relaxed)
    }

    pub fn inc_unrecognized(&self) {
        self.unrecognized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    pub fn inc_sink_failures(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn backpressure_warnings(&self) -> u64 {
        self.backpressure_warnings.load(Ordering::Relaxed)
    }

    pub fn inc_backpressure_warnings(&self) {
        self.backpressure_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received(),
            dispatched: self.dispatched(),
            unrecognized: self.unrecognized(),
            sink_failures: self.sink_failures(),
            backpressure_warnings: self.backpressure_warnings(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub dispatched: u64,
    pub unrecognized: u64,
    pub sink_failures: u64,
    pub backpressure_warnings: u64,
}
