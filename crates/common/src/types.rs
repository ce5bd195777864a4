//! Common types used across fxmatch
//!
//! This module provides the fundamental domain types used throughout
//! the order recording system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Create a new random OrderId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an OrderId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order side (ask or bid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Sell side
    #[serde(alias = "ask", alias = "Ask")]
    Ask,
    /// Buy side
    #[serde(alias = "bid", alias = "Bid")]
    Bid,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Ask => Side::Bid,
            Side::Bid => Side::Ask,
        }
    }

    /// Returns true if this is an ask
    pub fn is_ask(&self) -> bool {
        matches!(self, Side::Ask)
    }

    /// Returns true if this is a bid
    pub fn is_bid(&self) -> bool {
        matches!(self, Side::Bid)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Ask => write!(f, "ASK"),
            Side::Bid => write!(f, "BID"),
        }
    }
}

/// Currency-pair symbol, normalized at construction.
///
/// Normalization trims whitespace, removes the pair separator and
/// uppercases, so `" gbp/usd "` and `"GBPUSD"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Instrument(String);

impl Instrument {
    /// Create a new Instrument, normalizing the input
    pub fn new(s: impl AsRef<str>) -> Self {
        let normalized = s
            .as_ref()
            .trim()
            .chars()
            .filter(|c| *c != '/')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self(normalized)
    }

    /// Get the normalized symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Instrument {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Instrument {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_side() {
        assert_eq!(Side::Ask.opposite(), Side::Bid);
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert!(Side::Ask.is_ask());
        assert!(Side::Bid.is_bid());
    }

    #[test]
    fn test_side_deserialize_accepts_any_case() {
        let upper: Side = serde_json::from_str("\"ASK\"").unwrap();
        let lower: Side = serde_json::from_str("\"bid\"").unwrap();
        assert_eq!(upper, Side::Ask);
        assert_eq!(lower, Side::Bid);
    }

    #[test]
    fn test_instrument_normalization() {
        assert_eq!(Instrument::new("GBP/USD").as_str(), "GBPUSD");
        assert_eq!(Instrument::new(" gbp/usd "), Instrument::new("GBPUSD"));
        assert_eq!(Instrument::new("EURUSD").as_str(), "EURUSD");
    }
}
