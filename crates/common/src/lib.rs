//! Common types for fxmatch
//!
//! This crate provides the shared domain vocabulary used across all
//! fxmatch crates.
//!
//! # Modules
//!
//! - [`types`] - Shared domain types (OrderId, Side, Instrument)

pub mod types;

pub use types::*;
