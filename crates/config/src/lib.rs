//! Paygate configuration model
//!
//! The YAML file is parsed into [`GatewayConfig`] after `${VAR}` substitution.
//! Every section except `gateway` and `upstream` may be omitted.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub gateway: GatewayInfo,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub settlement: SettlementSection,
    pub upstream: UpstreamSection,
    /// Postgres-backed settlement history; in-memory when absent
    #[serde(default)]
    pub history: Option<HistoryStoreSection>,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub metrics: MetricsSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettlementSection {
    /// Length of the default history window ending now
    #[serde(default = "default_history_window_days")]
    pub history_window_days: u32,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Background settlements allowed to run at once
    #[serde(default = "default_async_max_in_flight")]
    pub async_max_in_flight: usize,
    /// How long shutdown waits for background settlements
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: u64,
}

impl Default for SettlementSection {
    fn default() -> Self {
        Self {
            history_window_days: default_history_window_days(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            async_max_in_flight: default_async_max_in_flight(),
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamSection {
    /// Base URL of the transactor (fees, registration, top-up)
    pub transactor_url: String,
    /// Base URL of the promise settler
    pub settler_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryStoreSection {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// pretty, json or compact
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Filter directive used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}
