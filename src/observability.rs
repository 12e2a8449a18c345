//! Observability (metrics counters, tracing setup)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Metrics handle for recording backend counters
#[derive(Debug, Default)]
pub struct Metrics {
    batches_fetched: AtomicU64,
    batch_cache_hits: AtomicU64,
    batch_cache_misses: AtomicU64,
    ledgers_served: AtomicU64,
    fetch_failures: AtomicU64,
    latest_lookups: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch_fetched(&self) {
        self.batches_fetched.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "batches_fetched", "Metric incremented");
    }

    pub fn batch_cache_hit(&self) {
        self.batch_cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "batch_cache_hits", "Metric incremented");
    }

    pub fn batch_cache_miss(&self) {
        self.batch_cache_misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "batch_cache_misses", "Metric incremented");
    }

    pub fn ledger_served(&self) {
        self.ledgers_served.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "ledgers_served", "Metric incremented");
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "fetch_failures", "Metric incremented");
    }

    pub fn latest_lookup(&self) {
        self.latest_lookups.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "latest_lookups", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_fetched: self.batches_fetched.load(Ordering::Relaxed),
            batch_cache_hits: self.batch_cache_hits.load(Ordering::Relaxed),
            batch_cache_misses: self.batch_cache_misses.load(Ordering::Relaxed),
            ledgers_served: self.ledgers_served.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            latest_lookups: self.latest_lookups.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub batches_fetched: u64,
    pub batch_cache_hits: u64,
    pub batch_cache_misses: u64,
    pub ledgers_served: u64,
    pub fetch_failures: u64,
    pub latest_lookups: u64,
}

/// Install the global fmt subscriber, honouring `RUST_LOG` when set
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.batch_fetched();
        metrics.batch_fetched();
        metrics.batch_cache_hit();
        metrics.batch_cache_miss();
        metrics.ledger_served();
        metrics.fetch_failed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_fetched, 2);
        assert_eq!(snapshot.batch_cache_hits, 1);
        assert_eq!(snapshot.batch_cache_misses, 1);
        assert_eq!(snapshot.ledgers_served, 1);
        assert_eq!(snapshot.fetch_failures, 1);
        assert_eq!(snapshot.latest_lookups, 0);
    }
}
