//! Primary order store
//!
//! Source of truth for live orders. The index structures in
//! [`crate::index`] only ever hold ids; every lookup resolves here.

use std::collections::HashMap;

use common::OrderId;
use parking_lot::RwLock;

use crate::domain::Order;

/// Thread-safe id-to-order map
///
/// Queries return clones taken under a read lock, consistent at the
/// instant of the call but not linearizable with concurrent mutators.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl OrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite by id
    pub fn put(&self, order: Order) {
        self.orders.write().insert(order.id, order);
    }

    /// Look up a live order by id
    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.read().get(id).cloned()
    }

    /// Delete by id, returning the removed order if it was live
    pub fn remove(&self, id: &OrderId) -> Option<Order> {
        self.orders.write().remove(id)
    }

    /// Snapshot of all live orders
    pub fn values(&self) -> Vec<Order> {
        self.orders.read().values().cloned().collect()
    }

    /// Number of live orders
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    /// True if no orders are live
    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}
