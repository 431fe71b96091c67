//! Port validation utilities
//!
//! Checking a port before binding is inherently racy: another process may
//! take it in between. These checks give early feedback at startup; the real
//! bind remains authoritative.

use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Validate that the configured HTTP port is in range and free
pub async fn validate_ports_available(config: &ServerConfig) -> Result<()> {
    let Some(port) = config.http_port else {
        warn!("No ports configured for server");
        return Ok(());
    };

    validate_port_range(port)?;

    let addr = format!("{}:{}", config.host, port);
    debug!("Checking HTTP port {}", port);

    match TcpListener::bind(&addr).await {
        Ok(listener) => {
            let local_addr = listener
                .local_addr()
                .map_err(|e| ServerError::bind(addr.clone(), e))?;
            drop(listener);

            info!("HTTP port {} is available ({})", port, local_addr);
            Ok(())
        }
        Err(e) => {
            error!("HTTP port {} is NOT available: {}", port, e);
            Err(ServerError::port_in_use(port, e.to_string()))
        }
    }
}

/// Reject port 0 and warn on privileged ports
pub fn validate_port_range(port: u16) -> Result<()> {
    if port == 0 {
        return Err(ServerError::ConfigError(
            "Port cannot be 0 (ephemeral port assignment not supported for explicit binding)"
                .to_string(),
        ));
    }
    if port < 1024 {
        warn!(
            "Port {} is a privileged port (requires root/admin privileges)",
            port
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port_range() {
        assert!(validate_port_range(0).is_err());
        assert!(validate_port_range(80).is_ok());
        assert!(validate_port_range(8080).is_ok());
        assert!(validate_port_range(65535).is_ok());
    }

    #[tokio::test]
    async fn test_occupied_port_fails_validation() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ServerConfig::http_only("127.0.0.1", port);
        let err = validate_ports_available(&config).await.unwrap_err();
        assert!(matches!(err, ServerError::PortInUse { port: p, .. } if p == port));
    }

    #[tokio::test]
    async fn test_no_http_port_is_ok() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            http_port: None,
        };
        assert!(validate_ports_available(&config).await.is_ok());
    }
}
