//! Core domain types for the order index
//!
//! An [`Order`] is immutable once created; a price, amount or side change
//! is modeled as cancel + place. The [`MatchKey`] groups orders that are
//! candidates for matching against each other.

use chrono::{DateTime, Utc};
use common::{Instrument, OrderId, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recorded spot order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Globally unique identifier, assigned at creation
    pub id: OrderId,
    /// Normalized currency-pair symbol (e.g. "GBPUSD")
    pub instrument: Instrument,
    /// Limit price, fixed-point decimal
    pub price: Decimal,
    /// Order quantity, strictly positive
    pub amount: u64,
    /// Ask or Bid
    pub side: Side,
    /// Creation timestamp, informational only
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order
    pub fn new(
        id: OrderId,
        instrument: Instrument,
        price: Decimal,
        amount: u64,
        side: Side,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            instrument,
            price,
            amount,
            side,
            created_at,
        }
    }

    /// The key this order is grouped under for matching
    pub fn match_key(&self) -> MatchKey {
        MatchKey::new(self.instrument.clone(), self.price, self.amount)
    }
}

/// Grouping key for match candidates
///
/// Two orders are candidates for matching iff their keys are equal and
/// their sides differ. The price is normalized on construction so that
/// trailing zeros do not split keys (1.2 and 1.2000 group together).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    instrument: Instrument,
    price: Decimal,
    amount: u64,
}

impl MatchKey {
    /// Create a key from its components, normalizing the price
    pub fn new(instrument: Instrument, price: Decimal, amount: u64) -> Self {
        Self {
            instrument,
            price: price.normalize(),
            amount,
        }
    }

    /// The key's instrument
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// The key's normalized price
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// The key's amount
    pub fn amount(&self) -> u64 {
        self.amount
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}x{}", self.instrument, self.price, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(instrument: &str, price: &str, amount: u64) -> MatchKey {
        MatchKey::new(
            Instrument::new(instrument),
            price.parse().unwrap(),
            amount,
        )
    }

    #[test]
    fn test_match_key_ignores_trailing_zeros() {
        assert_eq!(key("GBPUSD", "1.2", 100), key("GBPUSD", "1.2000", 100));
    }

    #[test]
    fn test_match_key_normalizes_instrument() {
        assert_eq!(key("GBP/USD", "1.2222", 2000), key("gbpusd", "1.2222", 2000));
    }

    #[test]
    fn test_match_key_distinguishes_components() {
        assert_ne!(key("GBPUSD", "1.2222", 2000), key("GBPUSD", "1.2223", 2000));
        assert_ne!(key("GBPUSD", "1.2222", 2000), key("GBPUSD", "1.2222", 2001));
        assert_ne!(key("GBPUSD", "1.2222", 2000), key("EURUSD", "1.2222", 2000));
    }

    #[test]
    fn test_order_match_key_uses_own_fields() {
        let order = Order::new(
            OrderId::new(),
            Instrument::new("GBP/USD"),
            "1.2222".parse().unwrap(),
            2000,
            Side::Ask,
            Utc::now(),
        );
        assert_eq!(order.match_key(), key("GBPUSD", "1.2222", 2000));
    }
}
