//! Server infrastructure for Paygate
//!
//! Lifecycle management for the HTTP listener: binding, graceful shutdown
//! through `CancellationToken`, and request tracing/metrics middleware.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, ServerExt};
//!
//! let config = ServerConfig::http_only("0.0.0.0", 8080);
//! HttpServer::new(config, router).run_with_signals().await?;
//! ```
//!
//! # Modules
//!
//! - [`config`] - Server configuration and port constants
//! - [`traits`] - `Server` and `ServerExt` traits
//! - [`http`] - HTTP server using Axum
//! - [`shutdown`] - Graceful shutdown utilities
//! - [`port_validator`] - Startup port checks

pub mod config;
pub mod error;
pub mod http;
pub mod port_validator;
pub mod shutdown;
pub mod traits;

pub use config::{ports, ServerConfig};
pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use port_validator::validate_ports_available;
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
