//! The match engine
//!
//! This module implements the insert/remove/query algorithms that keep
//! the order store, the key index and the two side indexes mutually
//! consistent.

use std::collections::HashSet;

use common::{OrderId, Side};
use tracing::{debug, info};

use crate::domain::{MatchKey, Order};
use crate::error::TradingError;
use crate::index::BucketIndex;
use crate::lock::KeyLockTable;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::store::OrderStore;

/// Capacity and sharding configuration for [`MatchEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLimits {
    /// Maximum ids tracked per key in the key index
    pub key_capacity: usize,
    /// Maximum ids appended per key to each side index
    pub side_capacity: usize,
    /// Maximum ids per side installed by a full rebuild
    pub rebuild_capacity: usize,
    /// Lock stripes serializing same-key mutators
    pub lock_shards: usize,
}

impl Default for IndexLimits {
    fn default() -> Self {
        Self {
            key_capacity: 3000,
            side_capacity: 2000,
            rebuild_capacity: 20_000,
            lock_shards: 64,
        }
    }
}

/// Match engine for a single currency pair
///
/// PROPERTIES:
/// 1. Insert is total: capacity overflow degrades to "excluded from
///    matching", never an error.
/// 2. Mutators that share a match key are applied one at a time; each
///    insert or remove takes effect as one atomic unit across all four
///    structures.
/// 3. Queries run lock-free against snapshots and never block mutators.
pub struct MatchEngine {
    store: OrderStore,
    key_index: BucketIndex,
    ask_index: BucketIndex,
    bid_index: BucketIndex,
    locks: KeyLockTable,
    rebuild_capacity: usize,
    metrics: EngineMetrics,
}

impl MatchEngine {
    /// Create an engine with default limits
    pub fn new() -> Self {
        Self::with_limits(IndexLimits::default())
    }

    /// Create an engine with explicit limits
    pub fn with_limits(limits: IndexLimits) -> Self {
        Self {
            store: OrderStore::new(),
            key_index: BucketIndex::new(limits.key_capacity),
            ask_index: BucketIndex::new(limits.side_capacity),
            bid_index: BucketIndex::new(limits.side_capacity),
            locks: KeyLockTable::new(limits.lock_shards),
            rebuild_capacity: limits.rebuild_capacity,
            metrics: EngineMetrics::new(),
        }
    }

    /// Record an order and update its key's match classification.
    ///
    /// Never fails. The caller is responsible for id uniqueness; changing
    /// an existing order is modeled as remove + insert.
    pub fn insert(&self, order: Order) {
        let key = order.match_key();
        let id = order.id;
        let side = order.side;

        let _guard = self.locks.lock(&key);

        self.store.put(order);
        self.metrics.orders_inserted.increment();
        self.metrics.live_orders.set(self.store.len() as u64);

        if !self.key_index.append(&key, id) {
            // Beyond key capacity: the order stays live and listable but
            // takes no part in matching.
            self.metrics.capped_appends.increment();
            debug!(%id, %key, "key bucket full, order excluded from matching");
            return;
        }

        let (own, opposite) = self.side_indexes(side);
        if opposite.contains_key(&key) {
            // The key is already in a matched state, an append suffices.
            if own.append(&key, id) {
                debug!(%id, %key, side = %side, "joined existing match");
            } else {
                self.metrics.capped_appends.increment();
                debug!(%id, %key, side = %side, "side bucket full, order excluded from matching");
            }
        } else if self.crosses(&key, id, side) {
            // First cross-match for this key: the side buckets do not
            // exist yet, so materialize both from the key bucket.
            let (asks, bids) = self.partition(&key);
            self.ask_index.replace(&key, asks);
            self.bid_index.replace(&key, bids);
            self.metrics.rebuilds.increment();
            info!(%key, "first cross-match, side buckets built");
        }
    }

    /// Remove a live order by id, returning it.
    ///
    /// Unknown ids leave every structure untouched.
    pub fn remove(&self, id: OrderId) -> Result<Order, TradingError> {
        // Peek to learn the key, then re-check under the key's stripe;
        // the order may be gone by the time the stripe is held.
        let Some(peeked) = self.store.get(&id) else {
            self.metrics.remove_misses.increment();
            return Err(TradingError::OrderNotFound(id));
        };
        let key = peeked.match_key();

        let _guard = self.locks.lock(&key);

        let Some(order) = self.store.remove(&id) else {
            self.metrics.remove_misses.increment();
            return Err(TradingError::OrderNotFound(id));
        };

        self.key_index.remove(&key, id);

        let (own, opposite) = self.side_indexes(order.side);
        if own.remove(&key, id) {
            // Own side emptied: the key leaves the matched state, so the
            // opposite bucket is dropped too even when it still holds
            // ids. A later opposite-side insert re-discovers those
            // orders through the key-bucket rescan.
            opposite.remove_key(&key);
            debug!(%key, side = %order.side, "side emptied, match dissolved");
        }

        self.metrics.orders_removed.increment();
        self.metrics.live_orders.set(self.store.len() as u64);
        info!(%id, %key, "order removed");
        Ok(order)
    }

    /// Snapshot of every live order
    pub fn all_orders(&self) -> Vec<Order> {
        self.store.values()
    }

    /// Snapshot of every order currently part of a match
    ///
    /// Ids whose order was removed between the index read and the store
    /// lookup are skipped.
    pub fn matched_orders(&self) -> Vec<Order> {
        let mut matched = Vec::new();
        for key in self.ask_index.keys() {
            if !self.bid_index.contains_key(&key) {
                continue;
            }
            let ids = self
                .ask_index
                .get(&key)
                .into_iter()
                .chain(self.bid_index.get(&key));
            for id in ids {
                if let Some(order) = self.store.get(&id) {
                    matched.push(order);
                }
            }
        }
        matched
    }

    /// Snapshot of every live order not currently part of a match
    pub fn unmatched_orders(&self) -> Vec<Order> {
        let matched: HashSet<OrderId> =
            self.matched_orders().into_iter().map(|order| order.id).collect();
        self.store
            .values()
            .into_iter()
            .filter(|order| !matched.contains(&order.id))
            .collect()
    }

    /// Number of live orders
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True if no orders are live
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Point-in-time engine counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn side_indexes(&self, side: Side) -> (&BucketIndex, &BucketIndex) {
        match side {
            Side::Ask => (&self.ask_index, &self.bid_index),
            Side::Bid => (&self.bid_index, &self.ask_index),
        }
    }

    /// True if the key bucket holds a live order on the opposite side of
    /// `side`, other than `new_id` itself
    fn crosses(&self, key: &MatchKey, new_id: OrderId, side: Side) -> bool {
        self.key_index
            .get(key)
            .into_iter()
            .filter(|id| *id != new_id)
            .filter_map(|id| self.store.get(&id))
            .any(|order| order.side == side.opposite())
    }

    /// Split the key bucket's live ids by side, each side capped at the
    /// rebuild capacity
    fn partition(&self, key: &MatchKey) -> (Vec<OrderId>, Vec<OrderId>) {
        let mut asks = Vec::new();
        let mut bids = Vec::new();
        for id in self.key_index.get(key) {
            let Some(order) = self.store.get(&id) else {
                continue;
            };
            let bucket = match order.side {
                Side::Ask => &mut asks,
                Side::Bid => &mut bids,
            };
            if bucket.len() < self.rebuild_capacity {
                bucket.push(id);
            }
        }
        (asks, bids)
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use common::Instrument;
    use std::sync::Arc;

    fn order(instrument: &str, price: &str, amount: u64, side: Side) -> Order {
        Order::new(
            OrderId::new(),
            Instrument::new(instrument),
            price.parse().unwrap(),
            amount,
            side,
            Utc::now(),
        )
    }

    fn gbpusd(price: &str, amount: u64, side: Side) -> Order {
        order("GBPUSD", price, amount, side)
    }

    fn id_set(orders: Vec<Order>) -> HashSet<OrderId> {
        orders.into_iter().map(|order| order.id).collect()
    }

    fn ids(orders: &[&Order]) -> HashSet<OrderId> {
        orders.iter().map(|order| order.id).collect()
    }

    #[test]
    fn test_list_all_tracks_inserts_and_removes() {
        let engine = MatchEngine::new();
        let a = gbpusd("1.2222", 2000, Side::Ask);
        let b = gbpusd("1.3333", 1000, Side::Bid);
        let c = gbpusd("1.4444", 500, Side::Ask);

        engine.insert(a.clone());
        engine.insert(b.clone());
        engine.insert(c.clone());
        assert_eq!(id_set(engine.all_orders()), ids(&[&a, &b, &c]));

        engine.remove(b.id).unwrap();
        assert_eq!(id_set(engine.all_orders()), ids(&[&a, &c]));
    }

    #[test]
    fn test_ask_then_bid_same_key_matches() {
        let engine = MatchEngine::new();
        let ask = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask.clone());
        assert!(engine.matched_orders().is_empty());

        engine.insert(bid.clone());
        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask, &bid]));
        assert!(engine.unmatched_orders().is_empty());
    }

    #[test]
    fn test_bid_then_ask_same_key_matches() {
        let engine = MatchEngine::new();
        let bid = gbpusd("1.2222", 2000, Side::Bid);
        let ask = gbpusd("1.2222", 2000, Side::Ask);

        engine.insert(bid.clone());
        engine.insert(ask.clone());

        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask, &bid]));
        assert!(engine.unmatched_orders().is_empty());
    }

    #[test]
    fn test_same_side_orders_never_match() {
        let engine = MatchEngine::new();
        let first = gbpusd("1.2222", 2000, Side::Ask);
        let second = gbpusd("1.2222", 2000, Side::Ask);

        engine.insert(first.clone());
        engine.insert(second.clone());

        assert!(engine.matched_orders().is_empty());
        assert_eq!(id_set(engine.unmatched_orders()), ids(&[&first, &second]));
    }

    #[test]
    fn test_trailing_zeros_do_not_prevent_a_match() {
        let engine = MatchEngine::new();
        let ask = gbpusd("1.2000", 2000, Side::Ask);
        let bid = gbpusd("1.2", 2000, Side::Bid);

        engine.insert(ask.clone());
        engine.insert(bid.clone());

        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask, &bid]));
    }

    #[test]
    fn test_rebuild_pulls_in_every_live_id() {
        let engine = MatchEngine::new();
        let ask1 = gbpusd("1.2222", 2000, Side::Ask);
        let ask2 = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask1.clone());
        engine.insert(ask2.clone());
        assert!(engine.matched_orders().is_empty());

        // First cross-match: both asks and the bid land in the buckets
        engine.insert(bid.clone());
        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask1, &ask2, &bid]));
        assert!(engine.unmatched_orders().is_empty());
        assert_eq!(engine.metrics().rebuilds, 1);
    }

    #[test]
    fn test_mixed_orders_classify_into_matched_and_unmatched() {
        let engine = MatchEngine::new();
        let a = gbpusd("1.2222", 2000, Side::Ask);
        let b = gbpusd("3.3333", 6000, Side::Bid);
        let c = gbpusd("1.2222", 2000, Side::Bid);
        let d = gbpusd("3.3334", 6000, Side::Ask);

        engine.insert(a.clone());
        engine.insert(b.clone());
        engine.insert(c.clone());
        engine.insert(d.clone());

        assert_eq!(id_set(engine.matched_orders()), ids(&[&a, &c]));
        assert_eq!(id_set(engine.unmatched_orders()), ids(&[&b, &d]));
    }

    #[test]
    fn test_removing_last_ask_dissolves_the_whole_match() {
        let engine = MatchEngine::new();
        let ask = gbpusd("1.2222", 2000, Side::Ask);
        let bid1 = gbpusd("1.2222", 2000, Side::Bid);
        let bid2 = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask.clone());
        engine.insert(bid1.clone());
        engine.insert(bid2.clone());
        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask, &bid1, &bid2]));

        // The ask side empties, which drops the bid bucket with it; the
        // surviving bids are classified unmatched again.
        engine.remove(ask.id).unwrap();
        assert!(engine.matched_orders().is_empty());
        assert_eq!(id_set(engine.unmatched_orders()), ids(&[&bid1, &bid2]));
    }

    #[test]
    fn test_new_ask_rematches_bids_after_dissolution() {
        let engine = MatchEngine::new();
        let ask = gbpusd("1.2222", 2000, Side::Ask);
        let bid1 = gbpusd("1.2222", 2000, Side::Bid);
        let bid2 = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask.clone());
        engine.insert(bid1.clone());
        engine.insert(bid2.clone());
        engine.remove(ask.id).unwrap();

        let replacement = gbpusd("1.2222", 2000, Side::Ask);
        engine.insert(replacement.clone());

        assert_eq!(
            id_set(engine.matched_orders()),
            ids(&[&replacement, &bid1, &bid2])
        );
    }

    #[test]
    fn test_removing_one_of_many_asks_keeps_the_match() {
        let engine = MatchEngine::new();
        let ask1 = gbpusd("1.2222", 2000, Side::Ask);
        let ask2 = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask1.clone());
        engine.insert(ask2.clone());
        engine.insert(bid.clone());

        engine.remove(ask1.id).unwrap();
        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask2, &bid]));
    }

    #[test]
    fn test_key_capacity_excludes_extras_from_matching() {
        let engine = MatchEngine::with_limits(IndexLimits {
            key_capacity: 3,
            ..IndexLimits::default()
        });
        let ask1 = gbpusd("1.2222", 2000, Side::Ask);
        let ask2 = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);
        let extra = gbpusd("1.2222", 2000, Side::Ask);

        engine.insert(ask1.clone());
        engine.insert(ask2.clone());
        engine.insert(bid.clone());
        // Fourth id on the key: silently dropped from the index
        engine.insert(extra.clone());

        assert_eq!(engine.all_orders().len(), 4);
        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask1, &ask2, &bid]));
        assert_eq!(id_set(engine.unmatched_orders()), ids(&[&extra]));
        assert_eq!(engine.metrics().capped_appends, 1);
    }

    #[test]
    fn test_side_capacity_excludes_late_joiners() {
        let engine = MatchEngine::with_limits(IndexLimits {
            side_capacity: 1,
            ..IndexLimits::default()
        });
        let ask = gbpusd("1.2222", 2000, Side::Ask);
        let bid1 = gbpusd("1.2222", 2000, Side::Bid);
        let bid2 = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask.clone());
        engine.insert(bid1.clone());
        // The bid bucket is at capacity, so this append is dropped
        engine.insert(bid2.clone());

        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask, &bid1]));
        assert_eq!(id_set(engine.unmatched_orders()), ids(&[&bid2]));
    }

    #[test]
    fn test_rebuild_bypasses_side_append_capacity() {
        let engine = MatchEngine::with_limits(IndexLimits {
            side_capacity: 1,
            ..IndexLimits::default()
        });
        let ask1 = gbpusd("1.2222", 2000, Side::Ask);
        let ask2 = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask1.clone());
        engine.insert(ask2.clone());
        engine.insert(bid.clone());

        // The rebuild installs both asks even though appends cap at one
        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask1, &ask2, &bid]));
    }

    #[test]
    fn test_rebuild_capacity_truncates_partitions() {
        let engine = MatchEngine::with_limits(IndexLimits {
            rebuild_capacity: 1,
            ..IndexLimits::default()
        });
        let ask1 = gbpusd("1.2222", 2000, Side::Ask);
        let ask2 = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask1.clone());
        engine.insert(ask2.clone());
        engine.insert(bid.clone());

        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask1, &bid]));
        assert_eq!(id_set(engine.unmatched_orders()), ids(&[&ask2]));
    }

    #[test]
    fn test_remove_unknown_id_reports_not_found() {
        let engine = MatchEngine::new();
        let err = engine.remove(OrderId::new()).unwrap_err();
        assert_matches!(err, TradingError::OrderNotFound(_));
    }

    #[test]
    fn test_second_remove_reports_not_found() {
        let engine = MatchEngine::new();
        let ask = gbpusd("1.2222", 2000, Side::Ask);
        engine.insert(ask.clone());

        assert_eq!(engine.remove(ask.id).unwrap().id, ask.id);
        assert_matches!(engine.remove(ask.id), Err(TradingError::OrderNotFound(_)));
        assert_eq!(engine.metrics().remove_misses, 1);
    }

    #[test]
    fn test_failed_remove_leaves_matches_intact() {
        let engine = MatchEngine::new();
        let ask = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);
        engine.insert(ask.clone());
        engine.insert(bid.clone());

        let _ = engine.remove(OrderId::new());
        assert_eq!(id_set(engine.matched_orders()), ids(&[&ask, &bid]));
    }

    #[test]
    fn test_metrics_track_engine_activity() {
        let engine = MatchEngine::new();
        let ask = gbpusd("1.2222", 2000, Side::Ask);
        let bid = gbpusd("1.2222", 2000, Side::Bid);

        engine.insert(ask.clone());
        engine.insert(bid.clone());
        engine.remove(ask.id).unwrap();
        let _ = engine.remove(ask.id);

        let snapshot = engine.metrics();
        assert_eq!(snapshot.orders_inserted, 2);
        assert_eq!(snapshot.orders_removed, 1);
        assert_eq!(snapshot.remove_misses, 1);
        assert_eq!(snapshot.rebuilds, 1);
        assert_eq!(snapshot.live_orders, 1);
    }

    #[test]
    fn test_concurrent_inserts_on_one_key_all_match() {
        let engine = Arc::new(MatchEngine::new());
        let threads = 8;
        let per_thread = 50;

        let handles: Vec<_> = (0..threads)
            .map(|thread| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        let side = if (thread + i) % 2 == 0 {
                            Side::Ask
                        } else {
                            Side::Bid
                        };
                        engine.insert(gbpusd("1.2222", 2000, side));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let total = threads * per_thread;
        assert_eq!(engine.all_orders().len(), total);
        assert_eq!(engine.matched_orders().len(), total);
        assert!(engine.unmatched_orders().is_empty());
    }

    #[test]
    fn test_concurrent_disjoint_keys_settle_deterministically() {
        let engine = Arc::new(MatchEngine::new());
        let threads = 8;

        let handles: Vec<_> = (0..threads)
            .map(|thread| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    // Each thread works a key of its own
                    let amount = 1000 + thread as u64;
                    let ask = gbpusd("1.2222", amount, Side::Ask);
                    let bid = gbpusd("1.2222", amount, Side::Bid);
                    let ask_id = ask.id;
                    engine.insert(ask);
                    engine.insert(bid);
                    engine.remove(ask_id).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every ask was removed, dissolving each key's match
        assert_eq!(engine.all_orders().len(), threads);
        assert!(engine.matched_orders().is_empty());
        assert_eq!(engine.unmatched_orders().len(), threads);
    }
}
