//! Server configuration

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Default port assignments
pub mod ports {
    /// Gateway HTTP port
    pub const GATEWAY_HTTP: u16 = 8080;
}

/// HTTP server bind configuration
///
/// ```
/// use server::config::ServerConfig;
///
/// let config = ServerConfig::http_only("127.0.0.1", 8080);
/// assert_eq!(config.http_port, Some(8080));
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// HTTP port; `None` disables the listener
    pub http_port: Option<u16>,
}

impl ServerConfig {
    /// Create a server config for HTTP only
    pub fn http_only(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            http_port: Some(port),
        }
    }

    /// Get HTTP socket address
    pub fn http_addr(&self) -> Option<Result<SocketAddr>> {
        self.http_port.map(|p| self.parse_addr(p))
    }

    fn parse_addr(&self, port: u16) -> Result<SocketAddr> {
        format!("{}:{}", self.host, port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::http_only("0.0.0.0", ports::GATEWAY_HTTP)
    }
}
