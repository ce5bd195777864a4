//! In-memory FX spot order index for fxmatch
//!
//! This crate records spot orders for a single currency pair and keeps a
//! live classification of every order as matched or unmatched. Two orders
//! match iff they share a [`MatchKey`](domain::MatchKey) (same instrument,
//! price and amount) and sit on opposite sides.
//!
//! # Modules
//!
//! - [`domain`] - Order and MatchKey types
//! - [`store`] - Primary id-to-order map
//! - [`index`] - Capped per-key id buckets (key index and side indexes)
//! - [`lock`] - Sharded per-key lock table
//! - [`engine`] - The insert/remove/query algorithms
//! - [`metrics`] - Engine counters and gauges
//! - [`service`] - Validating service layer on top of the engine
//! - [`error`] - Error types
//! - [`api`] - Axum HTTP handlers (feature `api`)

pub mod domain;
pub mod engine;
pub mod error;
pub mod index;
pub mod lock;
pub mod metrics;
pub mod service;
pub mod store;

#[cfg(feature = "api")]
pub mod api;

pub use domain::{Order, MatchKey};
pub use engine::{IndexLimits, MatchEngine};
pub use error::TradingError;
pub use service::{FxTradingService, PlaceOrderRequest, TradingService};

/// Result type for matchbook operations
pub type Result<T> = std::result::Result<T, TradingError>;
