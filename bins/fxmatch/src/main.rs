//! fxmatch CLI and Server Binary
//!
//! This is the main entry point for the fxmatch service. It provides
//! commands for initializing, validating, and starting the order
//! matching service.

use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::{
    generate_default_config, load_config, save_config, validate_config, FxmatchConfig,
};
use matchbook::{FxTradingService, IndexLimits, MatchEngine, TradingService};
use observability::{
    init_default_logging, init_logging, init_metrics, LogFormat, OrderFlowMetrics, OrderFlowTotals,
};
use server::{HealthState, HttpServer, ServerConfig, ServerExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Interval between engine metric snapshots published to Prometheus
const METRICS_PUBLISH_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start {
            config,
            port,
            metrics_port,
        } => start_service(config, port, metrics_port).await,
        Commands::Validate { config } => {
            init_default_logging("fxmatch")?;
            validate_command(config).await
        }
        Commands::Init { output } => {
            init_default_logging("fxmatch")?;
            init_command(output).await
        }
    }
}

async fn start_service<P: AsRef<Path>>(
    config_path: P,
    port_override: Option<u16>,
    metrics_port_override: Option<u16>,
) -> Result<()> {
    let config_path = config_path.as_ref();

    // Logging is not up yet, so config loading runs quiet
    let mut config = load_config(config_path)?;

    // Apply CLI overrides before validation so port checks see the
    // effective values
    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(port) = metrics_port_override {
        config.observability.metrics_port = Some(port);
    }

    let log_format = LogFormat::parse(&config.observability.log_format).unwrap_or_default();
    init_logging("fxmatch", &config.observability.log_level, log_format)?;

    info!("fxmatch starting...");
    debug!(?config_path, "Configuration loaded");

    let report = validate_config(&config);

    // Log warnings
    if !report.warnings.is_empty() {
        warn!("Configuration warnings:");
        for warning in &report.warnings {
            warn!(field = %warning.field, message = %warning.message);
        }
    }

    // Check validation errors
    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start service due to configuration errors");
    }

    run_service(config).await
}

async fn run_service(config: FxmatchConfig) -> Result<()> {
    let limits = IndexLimits {
        key_capacity: config.engine.key_capacity,
        side_capacity: config.engine.side_capacity,
        rebuild_capacity: config.engine.rebuild_capacity,
        lock_shards: config.engine.lock_shards,
    };

    let engine = Arc::new(MatchEngine::with_limits(limits));
    let service: Arc<dyn TradingService> = Arc::new(FxTradingService::new(
        engine.clone(),
        &config.service.instruments,
    ));

    info!(
        instruments = ?config.service.instruments,
        key_capacity = config.engine.key_capacity,
        side_capacity = config.engine.side_capacity,
        "Matching engine ready"
    );

    // Start the Prometheus exporter and mirror engine counters into it
    if let Some(metrics_port) = config.observability.metrics_port {
        init_metrics(metrics_port)?;
        spawn_metrics_publisher(engine.clone());
    }

    let health_state = Arc::new(HealthState::new(config.service.name.clone()));
    let router = matchbook::api::create_dyn_router(service)
        .merge(server::health::health_routes(health_state));

    let server_config = ServerConfig::new(config.server.host.clone(), config.server.port);
    let server = HttpServer::new(server_config, router);

    info!(address = %config.server.address(), "Starting HTTP API");

    server.run_with_ctrl_c().await?;

    info!("fxmatch shutdown complete");
    Ok(())
}

/// Periodically copy engine counters into the Prometheus recorder
fn spawn_metrics_publisher(engine: Arc<MatchEngine>) {
    let published = OrderFlowMetrics::new();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_PUBLISH_INTERVAL);
        loop {
            interval.tick().await;
            let snapshot = engine.metrics();
            published.publish(OrderFlowTotals {
                orders_inserted: snapshot.orders_inserted,
                orders_removed: snapshot.orders_removed,
                remove_misses: snapshot.remove_misses,
                rebuilds: snapshot.rebuilds,
                capped_appends: snapshot.capped_appends,
                live_orders: snapshot.live_orders,
            });
        }
    });
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

    // Print summary
    println!("\n=== Configuration Validation Report ===\n");

    // Defaults
    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    // Warnings
    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    // Errors
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
    println!("Service: {}", config.service.name);
    println!("Version: {}", config.service.version);
    println!("Instruments: {}", config.service.instruments.join(", "));
    println!("HTTP address: {}", config.server.address());
    println!(
        "Engine capacities: key={}, side={}, rebuild={}",
        config.engine.key_capacity, config.engine.side_capacity, config.engine.rebuild_capacity
    );
    match config.observability.metrics_port {
        Some(port) => println!("Metrics port: {}", port),
        None => println!("Metrics: disabled"),
    }

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    // Generate default config
    let config = generate_default_config();

    // Ensure parent directory exists
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    // Save config
    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("This configuration includes:");
    println!("  - Service metadata (name, version)");
    println!("  - 1 instrument (GBP/USD)");
    println!("  - Engine index capacities and lock striping");
    println!("  - Prometheus metrics on port 9100");
    println!();
    println!("Next steps:");
    println!("  1. Edit the configuration file to customize settings");
    println!(
        "  2. Run 'fxmatch validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'fxmatch start --config {:?}' to start the service",
        output_path
    );

    Ok(())
}
