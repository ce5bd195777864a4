//! Matchbook error types

use common::OrderId;
use thiserror::Error;

/// Errors that can occur while recording or cancelling orders
#[derive(Error, Debug)]
pub enum TradingError {
    /// Order failed validation at the service boundary
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Order id is not live
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
}

impl TradingError {
    /// Create an invalid-order error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOrder(reason.into())
    }
}
