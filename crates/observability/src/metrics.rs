//! Prometheus metrics infrastructure
//!
//! Exporter installation and request-level metric helpers.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Install the Prometheus exporter and serve `/metrics` on `addr`
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Request metrics for one HTTP server
///
/// # Metrics
///
/// * `server_requests_total` - requests processed, by server/method/status
/// * `server_request_duration_seconds` - request duration histogram, by server/method
/// * `server_requests_in_flight` - requests currently being handled
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    server_name: String,
}

impl RequestMetrics {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
        }
    }

    /// Record a completed request
    pub fn record_request(&self, method: &str, status_code: u16, duration: Duration) {
        counter!(
            "server_requests_total",
            "server" => self.server_name.clone(),
            "method" => method.to_string(),
            "status" => status_code.to_string()
        )
        .increment(1);

        histogram!(
            "server_request_duration_seconds",
            "server" => self.server_name.clone(),
            "method" => method.to_string()
        )
        .record(duration.as_secs_f64());
    }

    fn request_started(&self) {
        gauge!("server_requests_in_flight", "server" => self.server_name.clone()).increment(1.0);
    }

    fn request_finished(&self) {
        gauge!("server_requests_in_flight", "server" => self.server_name.clone()).decrement(1.0);
    }

    /// Get the server name
    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

/// Records duration and status when dropped
///
/// ```ignore
/// let mut guard = RequestMetricsGuard::new(&metrics, "GET");
/// let response = next.run(request).await;
/// guard.set_status(response.status().as_u16());
/// ```
pub struct RequestMetricsGuard<'a> {
    metrics: &'a RequestMetrics,
    method: String,
    start: Instant,
    status_code: u16,
}

impl<'a> RequestMetricsGuard<'a> {
    pub fn new(metrics: &'a RequestMetrics, method: impl Into<String>) -> Self {
        metrics.request_started();
        Self {
            metrics,
            method: method.into(),
            start: Instant::now(),
            // Dropped without a status means the handler future was abandoned.
            status_code: 499,
        }
    }

    /// Set the status code (call before drop)
    pub fn set_status(&mut self, code: u16) {
        self.status_code = code;
    }
}

impl Drop for RequestMetricsGuard<'_> {
    fn drop(&mut self) {
        self.metrics.request_finished();
        self.metrics
            .record_request(&self.method, self.status_code, self.start.elapsed());
    }
}
