//! Paygate CLI and Server Binary
//!
//! Entry point for the settlement gateway. It provides commands for
//! initializing, validating, and starting the gateway.

use anyhow::{Context, Result};
use cli::{Cli, Commands, LogFormatArg};
use config::{generate_default_config, load_config, save_config, validate_config, GatewayConfig};
use observability::{init_logging, init_metrics, LogFormat};
use server::{validate_ports_available, HttpServer, ServerConfig, ServerExt};
use settlement::api::create_router;
use settlement::{
    HistorySettings, HttpPromiseSettler, HttpTransactor, InMemorySettlementHistoryStore,
    ManagerSettings, PostgresSettlementHistoryStore, SettlementHistoryStore, SettlementManager,
    TracingObserver,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start {
            config,
            http,
            log_format,
        } => start_gateway(config, http, log_format).await,
        Commands::Validate { config } => {
            init_logging("paygate", LogFormat::Pretty, "info")?;
            info!("Executing 'validate' command");
            validate_command(config).await
        }
        Commands::Init { output } => {
            init_logging("paygate", LogFormat::Pretty, "info")?;
            info!("Executing 'init' command");
            init_command(output).await
        }
    }
}

async fn start_gateway<P: AsRef<Path>>(
    config_path: P,
    http_override: Option<u16>,
    log_format: Option<LogFormatArg>,
) -> Result<()> {
    let config = load_config(config_path.as_ref())?;

    let format_name = log_format
        .map(|f| f.as_str())
        .unwrap_or(config.logging.format.as_str());
    init_logging(
        "paygate",
        LogFormat::parse(format_name).unwrap_or_default(),
        &config.logging.level,
    )?;

    info!(gateway = %config.gateway.name, version = %config.gateway.version, "Paygate starting...");

    let report = validate_config(&config);

    for default in &report.defaults_applied {
        debug!(field = %default.field, value = %default.value, "Default applied");
    }

    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start gateway due to configuration errors");
    }

    if config.metrics.enabled {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.metrics.port)
            .parse()
            .with_context(|| format!("Invalid metrics address for host {}", config.server.host))?;
        init_metrics(addr)?;
    }

    let manager = Arc::new(build_manager(&config).await?);

    let http_port = http_override.unwrap_or(config.server.http_port);
    if http_override.is_none() {
        debug!(port = http_port, "Using configured HTTP port");
    }
    let server_config = ServerConfig::http_only(config.server.host.clone(), http_port);

    validate_ports_available(&server_config).await?;

    info!(http_port, "Starting gateway");

    HttpServer::new(server_config, create_router(Arc::clone(&manager)))
        .run_with_signals()
        .await?;

    let grace = Duration::from_secs(config.settlement.shutdown_grace_seconds);
    let in_flight = manager.in_flight_settlements();
    if manager.shutdown(grace).await {
        info!(drained = in_flight, "Background settlements finished");
    } else {
        warn!(
            grace_seconds = config.settlement.shutdown_grace_seconds,
            "Exiting with background settlements still running"
        );
    }

    info!("Paygate stopped");
    Ok(())
}

/// Wire production collaborators into a settlement manager
async fn build_manager(config: &GatewayConfig) -> Result<SettlementManager> {
    let timeout = Duration::from_secs(config.upstream.timeout_seconds);

    let transactor = HttpTransactor::new(&config.upstream.transactor_url, timeout)
        .context("Failed to create transactor client")?;
    let settler = HttpPromiseSettler::new(&config.upstream.settler_url, timeout)
        .context("Failed to create settler client")?;

    let history_store = build_history_store(config).await?;

    let settings = ManagerSettings {
        history: HistorySettings {
            window_days: config.settlement.history_window_days,
            default_page_size: config.settlement.default_page_size,
            max_page_size: config.settlement.max_page_size,
        },
        async_max_in_flight: config.settlement.async_max_in_flight,
    };

    info!(
        transactor = %config.upstream.transactor_url,
        settler = %config.upstream.settler_url,
        "Settlement collaborators configured"
    );

    Ok(SettlementManager::new(
        Arc::new(transactor),
        Arc::new(settler),
        history_store,
        Arc::new(TracingObserver),
        settings,
    ))
}

async fn build_history_store(config: &GatewayConfig) -> Result<Arc<dyn SettlementHistoryStore>> {
    let Some(history) = &config.history else {
        warn!("No history database configured, using in-memory settlement history");
        return Ok(Arc::new(InMemorySettlementHistoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(history.max_connections)
        .connect(&history.database_url)
        .await
        .context("Failed to connect to settlement history database")?;

    let store = PostgresSettlementHistoryStore::new(pool);
    store
        .ensure_schema()
        .await
        .context("Failed to prepare settlement history table")?;

    info!("Using PostgreSQL settlement history");
    Ok(Arc::new(store))
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Gateway: {}", config.gateway.name);
    println!("Version: {}", config.gateway.version);
    println!("Listen: {}:{}", config.server.host, config.server.http_port);
    println!("Transactor: {}", config.upstream.transactor_url);
    println!("Settler: {}", config.upstream.settler_url);
    println!(
        "History store: {}",
        if config.history.is_some() {
            "postgres"
        } else {
            "in-memory"
        }
    );

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Point upstream.transactor_url and upstream.settler_url at your services");
    println!("  2. Optionally add a history.database_url for PostgreSQL settlement history");
    println!(
        "  3. Run 'paygate validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  4. Run 'paygate start --config {:?}' to start the gateway",
        output_path
    );

    Ok(())
}
