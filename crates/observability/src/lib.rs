//! Observability infrastructure for fxmatch
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics
//! - Order-flow metric export helpers
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! // Initialize logging
//! init_logging("fxmatch", "info", LogFormat::Pretty)?;
//!
//! // Initialize metrics (optional)
//! observability::metrics::init_metrics(9100)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_default_logging, init_logging, LogFormat};
pub use metrics::{init_metrics, OrderFlowMetrics, OrderFlowTotals};
