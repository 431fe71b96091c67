//! HTTP server implementation using Axum

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use observability::{RequestMetrics, RequestMetricsGuard};
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::traits::Server;

/// HTTP server wrapping an Axum router
///
/// Every request passes through a `TraceLayer` span and the request-metrics
/// middleware before reaching the application routes.
#[derive(Clone)]
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
    running: Arc<AtomicBool>,
    bound_addr: Arc<RwLock<Option<SocketAddr>>>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let metrics = RequestMetrics::new("http");
        let router = router
            .layer(middleware::from_fn_with_state(metrics, track_request_metrics))
            .layer(TraceLayer::new_for_http());

        Self {
            config,
            router,
            running: Arc::new(AtomicBool::new(false)),
            bound_addr: Arc::new(RwLock::new(None)),
        }
    }

    fn bind_addr(&self) -> Result<SocketAddr> {
        self.config
            .http_addr()
            .ok_or_else(|| ServerError::ConfigError("HTTP port not configured".into()))?
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The instrumented router (for testing or inspection)
    pub fn router(&self) -> &Router {
        &self.router
    }
}

async fn track_request_metrics(
    State(metrics): State<RequestMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let mut guard = RequestMetricsGuard::new(&metrics, request.method().as_str());
    let response = next.run(request).await;
    guard.set_status(response.status().as_u16());
    response
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        "http"
    }

    fn address(&self) -> Option<SocketAddr> {
        *self.bound_addr.read()
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self, shutdown_token: CancellationToken) -> Result<()> {
        let addr = self.bind_addr()?;

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::bind(addr.to_string(), e))?;

        let local_addr = listener.local_addr().map_err(ServerError::Io)?;
        *self.bound_addr.write() = Some(local_addr);

        info!(%local_addr, "HTTP server listening");

        self.running.store(true, Ordering::SeqCst);

        let result = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                shutdown_token.cancelled().await;
                info!("HTTP server received shutdown signal");
            })
            .await;

        self.running.store(false, Ordering::SeqCst);
        *self.bound_addr.write() = None;

        match result {
            Ok(()) => {
                info!("HTTP server shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!(%e, "HTTP server error");
                Err(ServerError::Io(e))
            }
        }
    }
}
