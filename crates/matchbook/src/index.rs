//! Capped per-key id buckets
//!
//! One [`BucketIndex`] instance serves as the key index (all live ids per
//! match key) and two more serve as the ask/bid side indexes. Buckets are
//! ordered, duplicate-free and bounded: an append beyond capacity is
//! silently dropped, never an error. Excluded ids stay visible through
//! the primary store, they are just not considered for matching.

use std::collections::HashMap;

use common::OrderId;
use parking_lot::RwLock;

use crate::domain::MatchKey;

/// Map from match key to a capped ordered id bucket
///
/// An empty bucket is never kept: removal of the last id deletes the
/// bucket entry itself.
#[derive(Debug)]
pub struct BucketIndex {
    buckets: RwLock<HashMap<MatchKey, Vec<OrderId>>>,
    capacity: usize,
}

impl BucketIndex {
    /// Create an index whose buckets hold at most `capacity` ids
    pub fn new(capacity: usize) -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Append an id to the key's bucket, creating the bucket if absent.
    ///
    /// Returns `true` if the id is tracked afterwards, `false` if the
    /// append was dropped because the bucket is at capacity. Appending an
    /// id already present is a no-op that keeps the bucket duplicate-free.
    pub fn append(&self, key: &MatchKey, id: OrderId) -> bool {
        let mut buckets = self.buckets.write();
        let bucket = buckets.entry(key.clone()).or_default();
        if bucket.contains(&id) {
            return true;
        }
        if bucket.len() >= self.capacity {
            return false;
        }
        bucket.push(id);
        true
    }

    /// Drop an id from the key's bucket.
    ///
    /// Returns `true` iff the bucket emptied and was deleted. Unknown
    /// keys and ids not present in the bucket are no-ops.
    pub fn remove(&self, key: &MatchKey, id: OrderId) -> bool {
        let mut buckets = self.buckets.write();
        let Some(bucket) = buckets.get_mut(key) else {
            return false;
        };
        bucket.retain(|other| *other != id);
        if bucket.is_empty() {
            buckets.remove(key);
            true
        } else {
            false
        }
    }

    /// Install a bucket wholesale, bypassing the append capacity.
    ///
    /// Used by the rebuild path, which applies its own larger cap before
    /// calling. An empty `ids` deletes the bucket instead.
    pub fn replace(&self, key: &MatchKey, ids: Vec<OrderId>) {
        let mut buckets = self.buckets.write();
        if ids.is_empty() {
            buckets.remove(key);
        } else {
            buckets.insert(key.clone(), ids);
        }
    }

    /// Delete the key's bucket outright
    pub fn remove_key(&self, key: &MatchKey) {
        self.buckets.write().remove(key);
    }

    /// Ordered snapshot of the key's bucket, empty if absent
    pub fn get(&self, key: &MatchKey) -> Vec<OrderId> {
        self.buckets
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// True if the key currently has a bucket
    pub fn contains_key(&self, key: &MatchKey) -> bool {
        self.buckets.read().contains_key(key)
    }

    /// Snapshot of all keys with a bucket
    pub fn keys(&self) -> Vec<MatchKey> {
        self.buckets.read().keys().cloned().collect()
    }

    /// Number of keys with a bucket
    pub fn len(&self) -> usize {
        self.buckets.read().len()
    }

    /// True if no key has a bucket
    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }
}
