//! Service trait for recording and querying orders

use async_trait::async_trait;
use common::{OrderId, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Order;
use crate::error::TradingError;
use crate::metrics::MetricsSnapshot;

/// An order submission before validation
///
/// The instrument is taken as written by the caller; the service
/// normalizes it and checks it against the configured whitelist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub instrument: String,
    pub price: Decimal,
    pub amount: u64,
    pub side: Side,
}

/// Boundary between the transport layer and the order index
///
/// Implementations validate input, assign ids and timestamps, and keep
/// the engine as the single source of truth for queries.
#[async_trait]
pub trait TradingService: Send + Sync {
    /// Validate and record a new order, returning it with its assigned
    /// id and timestamp
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, TradingError>;

    /// Cancel a live order by id, returning the removed order
    async fn cancel_order(&self, id: OrderId) -> Result<Order, TradingError>;

    /// All live orders
    async fn all_orders(&self) -> Vec<Order>;

    /// Orders currently part of a match
    async fn matched_orders(&self) -> Vec<Order>;

    /// Live orders not currently part of a match
    async fn unmatched_orders(&self) -> Vec<Order>;

    /// Engine counters
    async fn metrics(&self) -> MetricsSnapshot;
}
