//! Server lifecycle traits

use async_trait::async_trait;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// A long-running listener with cooperative shutdown
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Bound address, once listening
    fn address(&self) -> Option<SocketAddr>;

    fn is_running(&self) -> bool;

    /// Serve until `shutdown` is cancelled, then drain and return.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or fails while serving.
    async fn run(&self, shutdown: CancellationToken) -> Result<()>;
}

/// Convenience methods available on every [`Server`]
pub trait ServerExt: Server + Sized {
    /// Run until SIGINT/SIGTERM
    fn run_with_signals(self) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            let shutdown = crate::shutdown::ShutdownController::with_signals();
            self.run(shutdown.token()).await
        }
    }
}

impl<T: Server + Sized> ServerExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    struct IdleServer;

    #[async_trait]
    impl Server for IdleServer {
        fn name(&self) -> &str {
            "idle"
        }

        fn address(&self) -> Option<SocketAddr> {
            None
        }

        fn is_running(&self) -> bool {
            false
        }

        async fn run(&self, shutdown: CancellationToken) -> Result<()> {
            shutdown.cancelled().await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_signals_waits_for_a_signal() {
        let result =
            tokio::time::timeout(std::time::Duration::from_secs(60), IdleServer.run_with_signals())
                .await;
        assert!(result.is_err());
    }
}
