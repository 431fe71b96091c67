//! Graceful shutdown coordination
//!
//! Built on `tokio_util::sync::CancellationToken`: a signal cancels the
//! controller's token, which every holder observes.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancels a shared token when the process is asked to stop
///
/// ```ignore
/// let shutdown = ShutdownController::with_signals();
/// http_server.run(shutdown.token()).await?;
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
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Create a controller cancelled on Ctrl+C or, on unix, SIGTERM
    ///
    /// Spawns the signal listener, so it must be called inside a runtime.
    pub fn with_signals() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            wait_for_signal().await;
            token.cancel();
        });

        controller
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to listen for SIGTERM: {}", e);
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = wait_for_ctrl_c() => {}
        _ = terminate.recv() => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            // Never resolve: without a signal source the token stays live.
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_tokens_share_cancellation() {
        let controller = ShutdownController::new();
        let first = controller.token();
        let second = controller.token();

        assert!(!second.is_cancelled());
        first.cancel();
        assert!(second.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_controller_stays_live_without_signal() {
        let controller = ShutdownController::with_signals();
        let token = controller.token();

        let waited = tokio::time::timeout(Duration::from_secs(60), token.cancelled()).await;
        assert!(waited.is_err());
        assert!(!token.is_cancelled());
    }
}
