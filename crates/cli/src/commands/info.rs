//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    identity: IdentityInfo,
    sender: SenderInfo,
    observability: ObservabilityInfo,
}

#[derive(Serialize)]
struct IdentityInfo {
    node_id: String,
    token_configured: bool,
}

#[derive(Serialize)]
struct SenderInfo {
    directory_addr: String,
    poll_interval_secs: u64,
}

#[derive(Serialize)]
struct ObservabilityInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &contracts::RelayConfig) -> ConfigInfo {
    ConfigInfo {
        identity: IdentityInfo {
            node_id: config.identity.node_id.clone(),
            token_configured: !config.identity.token.is_empty(),
        },
        sender: SenderInfo {
            directory_addr: config.sender.directory_addr.clone(),
            poll_interval_secs: config.sender.poll_interval_secs,
        },
        observability: ObservabilityInfo {
            metrics_port: config.observability.metrics_port,
        },
    }
}

fn print_config_info(config: &contracts::RelayConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Agreement Relay Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🪪 Identity");
    println!("   ├─ Node id: {}", config.identity.node_id);
    if config.identity.token.is_empty() {
        println!("   └─ Intake token: (none)");
    } else {
        println!("   └─ Intake token: (set)");
    }

    println!("\n📡 Sender");
    println!("   ├─ Directory: {}", config.sender.directory_addr);
    println!(
        "   └─ Poll interval: {}s",
        config.sender.poll_interval_secs
    );

    println!("\n📈 Observability");
    match config.observability.metrics_port {
        Some(port) => println!("   └─ Metrics port: {}", port),
        None => println!("   └─ Metrics port: disabled"),
    }

    println!();
}
