//! Metrics for the order index
//!
//! Cheap atomic counters kept inside the engine; a point-in-time
//! [`MetricsSnapshot`] can be taken for logging or export.

use std::sync::atomic::{AtomicU64, Ordering};

/// Simple atomic counter
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Simple gauge for current values
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Counters maintained by [`MatchEngine`](crate::engine::MatchEngine)
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Orders accepted by insert
    pub orders_inserted: Counter,
    /// Orders removed by id
    pub orders_removed: Counter,
    /// Remove calls that found no live order
    pub remove_misses: Counter,
    /// First-cross-match rebuilds of the side buckets
    pub rebuilds: Counter,
    /// Appends dropped by a bucket capacity
    pub capped_appends: Counter,
    /// Currently live orders
    pub live_orders: Gauge,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            orders_inserted: self.orders_inserted.get(),
            orders_removed: self.orders_removed.get(),
            remove_misses: self.remove_misses.get(),
            rebuilds: self.rebuilds.get(),
            capped_appends: self.capped_appends.get(),
            live_orders: self.live_orders.get(),
        }
    }

    pub fn reset(&self) {
        self.orders_inserted.reset();
        self.orders_removed.reset();
        self.remove_misses.reset();
        self.rebuilds.reset();
        self.capped_appends.reset();
        self.live_orders.set(0);
    }
}

/// Point-in-time view of the engine counters
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub orders_inserted: u64,
    pub orders_removed: u64,
    pub remove_misses: u64,
    pub rebuilds: u64,
    pub capped_appends: u64,
    pub live_orders: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increments() {
        let counter = Counter::new();
        counter.increment();
        counter.increment();
        assert_eq!(counter.get(), 2);

        counter.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = EngineMetrics::new();
        metrics.orders_inserted.increment();
        metrics.live_orders.set(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.orders_inserted, 1);
        assert_eq!(snapshot.live_orders, 1);
        assert_eq!(snapshot.orders_removed, 0);
    }
}
