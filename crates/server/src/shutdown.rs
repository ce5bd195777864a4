//! Graceful shutdown utilities using CancellationToken
//!
//! This module provides shutdown coordination using `tokio_util::sync::CancellationToken`.
//! Unlike oneshot channels:
//! - Tokens can be cloned and shared across multiple tasks
//! - Child tokens can be created that are cancelled when parent is cancelled
//! - Cancellation can be checked without consuming the token
//! - Manual cancellation is supported

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A shutdown controller that coordinates graceful shutdown across multiple components.
///
/// # Example
///
/// ```ignore
/// let shutdown = ShutdownController::with_ctrl_c();
///
/// // Clone a token for each background task
/// let server_token = shutdown.child_token();
///
/// tokio::spawn(async move {
///     server.run(server_token).await;
/// });
///
/// // Wait for Ctrl+C or manual shutdown
/// shutdown.wait_for_shutdown().await;
/// ```
#[derive(Clone)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    /// Create a new shutdown controller
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Create a new shutdown controller that listens for Ctrl+C
    ///
    /// This spawns a background task that will cancel the token when Ctrl+C is received.
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown...");
                    token.cancel();
                }
                Err(e) => {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        });

        controller
    }

    /// Get a child token that will be cancelled when this controller is cancelled.
    ///
    /// Child tokens can also be cancelled independently without affecting the parent.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Get a clone of the main token
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger shutdown manually
    pub fn shutdown(&self) {
        info!("Manual shutdown triggered");
        self.token.cancel();
    }

    /// Check if shutdown has been triggered
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for shutdown to be triggered (either Ctrl+C or manual)
    pub async fn wait_for_shutdown(&self) {
        self.token.cancelled().await;
    }
}
