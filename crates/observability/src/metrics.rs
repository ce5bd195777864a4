//! Prometheus metrics infrastructure
//!
//! This module provides utilities for initializing Prometheus metrics
//! and publishing order-flow totals from the matching engine.

use metrics::{counter, gauge, Counter, Gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP server on the specified port that exposes metrics
/// at the `/metrics` endpoint.
///
/// # Arguments
///
/// * `port` - Port to expose metrics on
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9100)?;
/// // Metrics available at http://localhost:9100/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Cumulative order-flow totals to publish
///
/// The engine keeps its own counters; callers snapshot those and hand the
/// totals here. Counters are published with absolute values so the mirror
/// can run at any interval without drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFlowTotals {
    pub orders_inserted: u64,
    pub orders_removed: u64,
    pub remove_misses: u64,
    pub rebuilds: u64,
    pub capped_appends: u64,
    pub live_orders: u64,
}

/// Order-flow metrics published to Prometheus
///
/// # Metrics
///
/// * `fxmatch_orders_inserted_total` - Orders accepted by the engine
/// * `fxmatch_orders_removed_total` - Orders removed from the engine
/// * `fxmatch_remove_misses_total` - Remove calls for unknown order ids
/// * `fxmatch_index_rebuilds_total` - Side-index rebuilds triggered by a cross match
/// * `fxmatch_capped_appends_total` - Appends dropped by an index at capacity
/// * `fxmatch_live_orders` - Orders currently resident in the store
///
/// # Example
///
/// ```ignore
/// let metrics = OrderFlowMetrics::new();
/// metrics.publish(OrderFlowTotals {
///     orders_inserted: 10,
///     live_orders: 4,
///     ..Default::default()
/// });
/// ```
#[derive(Clone)]
pub struct OrderFlowMetrics {
    orders_inserted: Counter,
    orders_removed: Counter,
    remove_misses: Counter,
    rebuilds: Counter,
    capped_appends: Counter,
    live_orders: Gauge,
}

impl OrderFlowMetrics {
    pub fn new() -> Self {
        Self {
            orders_inserted: counter!("fxmatch_orders_inserted_total"),
            orders_removed: counter!("fxmatch_orders_removed_total"),
            remove_misses: counter!("fxmatch_remove_misses_total"),
            rebuilds: counter!("fxmatch_index_rebuilds_total"),
            capped_appends: counter!("fxmatch_capped_appends_total"),
            live_orders: gauge!("fxmatch_live_orders"),
        }
    }

    /// Publish a snapshot of cumulative totals
    pub fn publish(&self, totals: OrderFlowTotals) {
        self.orders_inserted.absolute(totals.orders_inserted);
        self.orders_removed.absolute(totals.orders_removed);
        self.remove_misses.absolute(totals.remove_misses);
        self.rebuilds.absolute(totals.rebuilds);
        self.capped_appends.absolute(totals.capped_appends);
        self.live_orders.set(totals.live_orders as f64);
    }
}

impl Default for OrderFlowMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_recorder_does_not_panic() {
        // Without an installed recorder the handles are no-ops
        let metrics = OrderFlowMetrics::new();
        metrics.publish(OrderFlowTotals {
            orders_inserted: 3,
            orders_removed: 1,
            live_orders: 2,
            ..Default::default()
        });
    }
}
