//! HTTP server infrastructure for fxmatch
//!
//! This crate provides an Axum-based HTTP server with unified lifecycle
//! management and graceful shutdown.
//!
//! # Architecture
//!
//! The server implements the [`Server`] trait, which provides a consistent
//! interface for running and monitoring it. The [`ServerExt`] trait provides
//! convenience methods like `spawn()` and `run_with_ctrl_c()`.
//!
//! Shutdown coordination uses `CancellationToken` from `tokio_util`, allowing
//! hierarchical shutdown where cancelling a parent token automatically cancels
//! all child tokens.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, Server, ServerExt};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::new("0.0.0.0", 8080);
//!     let server = HttpServer::new(config, router);
//!
//!     // Run with Ctrl+C handling
//!     server.run_with_ctrl_c().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Server bind configuration
//! - [`traits`] - `Server` and `ServerExt` traits
//! - [`http`] - HTTP server using Axum
//! - [`health`] - Health check endpoints
//! - [`shutdown`] - Graceful shutdown utilities

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod shutdown;
pub mod traits;

// Re-exports for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use health::{HealthState, HealthStatus};
pub use http::HttpServer;
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
