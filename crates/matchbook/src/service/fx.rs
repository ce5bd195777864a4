//! FX spot implementation of [`TradingService`]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{Instrument, OrderId};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::domain::Order;
use crate::engine::MatchEngine;
use crate::error::TradingError;
use crate::metrics::MetricsSnapshot;
use crate::service::traits::{PlaceOrderRequest, TradingService};

/// Maximum fractional digits accepted on a price
const MAX_PRICE_SCALE: u32 = 4;

/// Validating service for FX spot orders
///
/// Accepts orders for a whitelist of instruments, assigns each a fresh
/// id and creation timestamp, and hands it to the engine.
pub struct FxTradingService {
    engine: Arc<MatchEngine>,
    instruments: Vec<Instrument>,
}

impl FxTradingService {
    /// Create a service accepting the given instruments
    ///
    /// Whitelist entries are normalized, so "GBP/USD" and "gbpusd"
    /// configure the same instrument.
    pub fn new<I, S>(engine: Arc<MatchEngine>, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            engine,
            instruments: instruments.into_iter().map(Instrument::new).collect(),
        }
    }

    /// The engine backing this service
    pub fn engine(&self) -> &Arc<MatchEngine> {
        &self.engine
    }

    fn validate(&self, request: &PlaceOrderRequest) -> Result<Instrument, TradingError> {
        let instrument = Instrument::new(&request.instrument);
        if !self.instruments.contains(&instrument) {
            return Err(TradingError::invalid(format!(
                "unsupported instrument: {}",
                request.instrument
            )));
        }
        if request.amount < 1 {
            return Err(TradingError::invalid("amount must be at least 1"));
        }
        if request.price <= Decimal::ZERO {
            return Err(TradingError::invalid("price must be positive"));
        }
        if request.price.normalize().scale() > MAX_PRICE_SCALE {
            return Err(TradingError::invalid(format!(
                "price precision is limited to {} decimal places",
                MAX_PRICE_SCALE
            )));
        }
        Ok(instrument)
    }
}

#[async_trait]
impl TradingService for FxTradingService {
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, TradingError> {
        let instrument = match self.validate(&request) {
            Ok(instrument) => instrument,
            Err(err) => {
                debug!(%err, "order rejected");
                return Err(err);
            }
        };

        let order = Order::new(
            OrderId::new(),
            instrument,
            request.price,
            request.amount,
            request.side,
            Utc::now(),
        );
        info!(
            id = %order.id,
            instrument = %order.instrument,
            side = %order.side,
            amount = order.amount,
            "placing order"
        );
        self.engine.insert(order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, id: OrderId) -> Result<Order, TradingError> {
        let order = self.engine.remove(id)?;
        info!(%id, "order cancelled");
        Ok(order)
    }

    async fn all_orders(&self) -> Vec<Order> {
        self.engine.all_orders()
    }

    async fn matched_orders(&self) -> Vec<Order> {
        self.engine.matched_orders()
    }

    async fn unmatched_orders(&self) -> Vec<Order> {
        self.engine.unmatched_orders()
    }

    async fn metrics(&self) -> MetricsSnapshot {
        self.engine.metrics()
    }
}
