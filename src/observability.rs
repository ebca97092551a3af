//! Per-run counters reported through tracing

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one ingestion run
#[derive(Debug, Default)]
pub struct RunStats {
    pages_fetched: AtomicU64,
    items_seen: AtomicU64,
    items_rejected: AtomicU64,
    records_emitted: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "pages_fetched", "Metric incremented");
    }

    pub fn item_seen(&self) {
        self.items_seen.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "items_seen", "Metric incremented");
    }

    pub fn item_rejected(&self) {
        self.items_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "items_rejected", "Metric incremented");
    }

    pub fn records_emitted(&self, count: usize) {
        self.records_emitted.fetch_add(count as u64, Ordering::Relaxed);
        tracing::debug!(counter = "records_emitted", count, "Metric incremented");
    }

    pub fn snapshot(&self) -> RunStatsSnapshot {
        RunStatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            items_seen: self.items_seen.load(Ordering::Relaxed),
            items_rejected: self.items_rejected.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self, provider: &str) {
        let s = self.snapshot();
        tracing::info!(
            provider,
            pages_fetched = s.pages_fetched,
            items_seen = s.items_seen,
            items_rejected = s.items_rejected,
            records_emitted = s.records_emitted,
            "Run finished"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatsSnapshot {
    pub pages_fetched: u64,
    pub items_seen: u64,
    pub items_rejected: u64,
    pub records_emitted: u64,
}
