//! Service layer over the match engine
//!
//! The engine trusts its inputs; this layer is where validation, id
//! assignment and timestamping happen before an order reaches it.

mod fx;
mod traits;

pub use fx::FxTradingService;
pub use traits::{PlaceOrderRequest, TradingService};
