//! Observability infrastructure for Paygate
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics
//! - HTTP request metric helpers
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("paygate", LogFormat::Pretty, "info")?;
//!
//! // Optional Prometheus exporter
//! observability::init_metrics("0.0.0.0:9090".parse()?)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, RequestMetrics, RequestMetricsGuard};
