//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Agreement Relay - periodic bandwidth agreement dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "agreement-relay",
    author,
    version,
    about = "Periodic bandwidth agreement dispatcher",
    long_about = "Dispatches pending bandwidth agreements to their satellites.\n\n\
                  On each poll cycle the relay lists unsent agreements, groups \n\
                  them by satellite, resolves each satellite through the \n\
                  directory service, streams the batch to its intake endpoint, \n\
                  and deletes the records the settlement summary covers."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "AGREEMENT_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "AGREEMENT_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay until interrupted
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "AGREEMENT_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// Override directory service address from configuration
    #[arg(long, env = "AGREEMENT_RELAY_DIRECTORY_ADDR")]
    pub directory_addr: Option<String>,

    /// Override poll interval in seconds from configuration
    #[arg(long, env = "AGREEMENT_RELAY_POLL_INTERVAL")]
    pub poll_interval: Option<u64>,

    /// Metrics server port (0 = disabled)
    #[arg(long, env = "AGREEMENT_RELAY_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// JSON file of agreements to seed the in-memory store with
    #[arg(long, env = "AGREEMENT_RELAY_AGREEMENTS")]
    pub agreements: Option<PathBuf>,

    /// Validate configuration and exit without running the relay
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
