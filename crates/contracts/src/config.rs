//! RelayConfig - externally supplied relay settings
//!
//! Parsed by `config_loader`; consumed by the CLI and the sender.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default poll interval between dispatch cycles (one hour).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3600;

/// Default directory service address.
pub const DEFAULT_DIRECTORY_ADDR: &str = "127.0.0.1:7777";

/// Top-level relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Sender cadence and directory endpoint
    #[serde(default)]
    pub sender: SenderSection,

    /// This node's identity
    pub identity: IdentitySection,

    /// Logging / metrics settings
    #[serde(default)]
    pub observability: ObservabilitySection,
}

/// Sender-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderSection {
    /// Seconds between dispatch cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Directory service address (host:port)
    #[serde(default = "default_directory_addr")]
    pub directory_addr: String,
}

impl SenderSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for SenderSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            directory_addr: default_directory_addr(),
        }
    }
}

/// Node identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySection {
    /// This storage node's id
    pub node_id: String,

    /// Pre-shared intake token
    #[serde(default)]
    pub token: String,
}

/// Observability settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilitySection {
    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_directory_addr() -> String {
    DEFAULT_DIRECTORY_ADDR.to_string()
}
