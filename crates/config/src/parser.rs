use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GatewayConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    parse_config(&content)
}

/// Parse configuration text, substituting environment variables first
pub fn parse_config(content: &str) -> Result<GatewayConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    debug!("Environment variable substitution completed");

    let config: GatewayConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!(gateway = %config.gateway.name, "Configuration loaded successfully");
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> GatewayConfig {
    GatewayConfig {
        gateway: GatewayInfo {
            name: "paygate".to_string(),
            version: "0.1.0".to_string(),
        },
        server: ServerSection::default(),
        settlement: SettlementSection::default(),
        upstream: UpstreamSection {
            transactor_url: "http://localhost:8888/api/v1".to_string(),
            settler_url: "http://localhost:8889/api/v1".to_string(),
            timeout_seconds: default_timeout_seconds(),
        },
        history: None,
        logging: LoggingSection::default(),
        metrics: MetricsSection::default(),
    }
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &GatewayConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}
