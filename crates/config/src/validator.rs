use crate::*;
use regex::Regex;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Gateway name is required")]
    MissingGatewayName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("{field}: invalid URL '{value}': {message}")]
    InvalidUrl {
        field: String,
        value: String,
        message: String,
    },

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("{field} ({value}) exceeds the maximum of {max}")]
    ValueTooLarge { field: String, value: u64, max: u64 },

    #[error("default_page_size ({default}) exceeds max_page_size ({max})")]
    PageSizeExceedsMax { default: u32, max: u32 },

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Port {port} is used by both {first} and {second}")]
    PortClash {
        port: u16,
        first: String,
        second: String,
    },

    #[error("History store: database_url is required")]
    MissingDatabaseUrl,

    #[error("Environment variable placeholder left unresolved in {field}")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &GatewayConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_gateway(&config.gateway, &mut report);
    validate_settlement(&config.settlement, &mut report);
    validate_upstream(&config.upstream, &mut report);
    validate_history(config.history.as_ref(), &mut report);
    validate_logging(&config.logging, &mut report);
    validate_ports(config, &mut report);

    report
}

fn validate_gateway(gateway: &GatewayInfo, report: &mut ValidationReport) {
    if gateway.name.trim().is_empty() {
        report.add_error(ValidationError::MissingGatewayName);
    }

    let version_ok = Regex::new(r"^\d+\.\d+\.\d+$")
        .map(|re| re.is_match(&gateway.version))
        .unwrap_or(false);
    if !version_ok {
        report.add_error(ValidationError::InvalidVersionFormat(gateway.version.clone()));
    }
}

/// Longest history window accepted; keeps `now - window` inside chrono's range
pub const MAX_HISTORY_WINDOW_DAYS: u32 = 36_500;

fn validate_settlement(settlement: &SettlementSection, report: &mut ValidationReport) {
    let positive = [
        ("settlement.history_window_days", settlement.history_window_days as u64),
        ("settlement.default_page_size", settlement.default_page_size as u64),
        ("settlement.max_page_size", settlement.max_page_size as u64),
        ("settlement.async_max_in_flight", settlement.async_max_in_flight as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            report.add_error(ValidationError::InvalidPositiveInteger {
                field: field.to_string(),
            });
        }
    }

    if settlement.history_window_days > MAX_HISTORY_WINDOW_DAYS {
        report.add_error(ValidationError::ValueTooLarge {
            field: "settlement.history_window_days".to_string(),
            value: u64::from(settlement.history_window_days),
            max: u64::from(MAX_HISTORY_WINDOW_DAYS),
        });
    }

    if settlement.default_page_size > settlement.max_page_size {
        report.add_error(ValidationError::PageSizeExceedsMax {
            default: settlement.default_page_size,
            max: settlement.max_page_size,
        });
    }

    if settlement.shutdown_grace_seconds == 0 {
        report.add_warning(
            "settlement.shutdown_grace_seconds",
            "Background settlements will be abandoned immediately on shutdown",
        );
    }
}

fn validate_upstream(upstream: &UpstreamSection, report: &mut ValidationReport) {
    validate_url("upstream.transactor_url", &upstream.transactor_url, report);
    validate_url("upstream.settler_url", &upstream.settler_url, report);

    if upstream.timeout_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "upstream.timeout_seconds".to_string(),
        });
    }
}

fn validate_url(field: &str, value: &str, report: &mut ValidationReport) {
    if has_unresolved_env_vars(value) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: field.to_string(),
        });
        return;
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => report.add_error(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => report.add_error(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        }),
    }
}

fn validate_history(history: Option<&HistoryStoreSection>, report: &mut ValidationReport) {
    let Some(history) = history else {
        report.add_default("history", "in-memory store");
        return;
    };

    if history.database_url.trim().is_empty() {
        report.add_error(ValidationError::MissingDatabaseUrl);
    } else if has_unresolved_env_vars(&history.database_url) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "history.database_url".to_string(),
        });
    }

    if history.max_connections == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "history.max_connections".to_string(),
        });
    }
}

fn validate_logging(logging: &LoggingSection, report: &mut ValidationReport) {
    if !["pretty", "json", "compact"].contains(&logging.format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}

fn validate_ports(config: &GatewayConfig, report: &mut ValidationReport) {
    if config.server.http_port == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "server.http_port".to_string(),
        });
    }

    if config.metrics.enabled && config.metrics.port == config.server.http_port {
        report.add_error(ValidationError::PortClash {
            port: config.metrics.port,
            first: "server.http_port".to_string(),
            second: "metrics.port".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let report = validate_config(&generate_default_config());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report
            .defaults_applied
            .iter()
            .any(|d| d.field == "history" && d.value == "in-memory store"));
    }

    #[test]
    fn test_page_size_above_max_is_error() {
        let mut config = generate_default_config();
        config.settlement.default_page_size = 500;
        config.settlement.max_page_size = 100;
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::PageSizeExceedsMax { default: 500, max: 100 })));
    }

    #[test]
    fn test_history_window_upper_bound() {
        let mut config = generate_default_config();
        config.settlement.history_window_days = MAX_HISTORY_WINDOW_DAYS;
        assert!(validate_config(&config).is_valid());

        config.settlement.history_window_days = 100_000_000;
        let report = validate_config(&config);
        assert!(report.errors.iter().any(|e| matches!(
            e,
            ValidationError::ValueTooLarge { field, value: 100_000_000, .. }
                if field == "settlement.history_window_days"
        )));
    }

    #[test]
    fn test_bad_urls_and_zero_values() {
        let mut config = generate_default_config();
        config.upstream.transactor_url = "not a url".to_string();
        config.upstream.settler_url = "ftp://settler".to_string();
        config.settlement.async_max_in_flight = 0;
        let report = validate_config(&config);
        assert_eq!(
            report
                .errors
                .iter()
                .filter(|e| matches!(e, ValidationError::InvalidUrl { .. }))
                .count(),
            2
        );
        assert!(report.errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidPositiveInteger { field } if field == "settlement.async_max_in_flight"
        )));
    }

    #[test]
    fn test_unresolved_database_url() {
        let mut config = generate_default_config();
        config.history = Some(HistoryStoreSection {
            database_url: "${PAYGATE_DB_URL}".to_string(),
            max_connections: 5,
        });
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnresolvedEnvVar { .. })));
    }

    #[test]
    fn test_metrics_port_clash() {
        let mut config = generate_default_config();
        config.metrics.enabled = true;
        config.metrics.port = config.server.http_port;
        config.logging.format = "xml".to_string();
        let report = validate_config(&config);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::PortClash { .. })));
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidLogFormat(_))));
    }
}
