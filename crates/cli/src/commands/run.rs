//! `run` command implementation.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::relay::{Relay, RelaySettings};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref addr) = args.directory_addr {
        info!(directory_addr = %addr, "Overriding directory address from CLI");
        config.sender.directory_addr = addr.clone();
    }
    if let Some(secs) = args.poll_interval {
        info!(poll_interval_secs = secs, "Overriding poll interval from CLI");
        config.sender.poll_interval_secs = secs;
    }
    if let Some(port) = args.metrics_port {
        config.observability.metrics_port = if port == 0 { None } else { Some(port) };
    }

    info!(
        node_id = %config.identity.node_id,
        directory_addr = %config.sender.directory_addr,
        poll_interval_secs = config.sender.poll_interval_secs,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    // Start the metrics exporter if configured
    if let Some(port) = config.observability.metrics_port {
        observability::init_metrics_only(port)
            .with_context(|| format!("Failed to start metrics exporter on port {port}"))?;
    }

    let relay = Relay::new(RelaySettings {
        config,
        agreements: args.agreements.clone(),
    });

    let token = CancellationToken::new();
    let run = relay.run(token.clone());
    tokio::pin!(run);

    info!("Starting relay...");

    // Run the relay, racing a shutdown signal; on signal, cancel and let
    // the dispatch loop drain its error log before returning.
    let stats = tokio::select! {
        result = &mut run => result,
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping relay...");
            token.cancel();
            run.await
        }
    }
    .context("Relay execution failed")?;

    info!(
        ticks = stats.ticks,
        groups_dispatched = stats.groups_dispatched,
        agreements_sent = stats.agreements_sent,
        records_deleted = stats.records_deleted,
        deliveries_failed = stats.deliveries_failed,
        "Relay completed successfully"
    );

    info!("Agreement Relay finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::RelayConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Identity:");
    println!("  Node id: {}", config.identity.node_id);
    println!(
        "  Intake token: {}",
        if config.identity.token.is_empty() {
            "(none)"
        } else {
            "(set)"
        }
    );
    println!("\nSender:");
    println!("  Directory: {}", config.sender.directory_addr);
    println!("  Poll interval: {}s", config.sender.poll_interval_secs);

    println!("\nObservability:");
    match config.observability.metrics_port {
        Some(port) => println!("  Metrics port: {}", port),
        None => println!("  Metrics port: disabled"),
    }

    println!();
}
