//! Relay assembly.
//!
//! Wires the in-memory store, the directory client, the node identity, and
//! the TCP intake client into a running `AgreementSender`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use contracts::{Agreement, NodeIdentity, RelayConfig, SatelliteId};
use directory::DirectoryClient;
use intake::TcpIntakeClient;
use sender::{AgreementSender, SenderConfig, SenderMetricsSnapshot};
use store::MemoryStore;

/// Everything the relay needs to assemble a sender.
pub struct RelaySettings {
    /// Loaded and validated configuration
    pub config: RelayConfig,

    /// Optional JSON file of agreements to seed the store with
    pub agreements: Option<PathBuf>,
}

/// One record in an agreement seed file.
#[derive(Debug, Deserialize)]
struct SeedAgreement {
    satellite: String,
    payload: String,
    signature: String,
}

/// Assembled relay, ready to run.
pub struct Relay {
    settings: RelaySettings,
}

impl Relay {
    pub fn new(settings: RelaySettings) -> Self {
        Self { settings }
    }

    /// Run the relay until the token fires.
    ///
    /// Returns the metrics snapshot taken at shutdown. Delivery errors
    /// accumulated over the run surface as `SenderError::Aggregate`; each one
    /// is also logged individually here before the error propagates.
    pub async fn run(self, token: CancellationToken) -> Result<SenderMetricsSnapshot> {
        let config = self.settings.config;

        let store = MemoryStore::new();
        if let Some(ref path) = self.settings.agreements {
            let seeded = seed_store(&store, path)?;
            info!(count = seeded, path = %path.display(), "Seeded agreement store");
        }

        let directory = DirectoryClient::new(&config.sender.directory_addr)
            .context("Failed to construct directory client")?;
        let identity = NodeIdentity::new(&config.identity.node_id, &config.identity.token);
        let intake = TcpIntakeClient::new();

        let sender = AgreementSender::initialize(
            store,
            directory,
            identity,
            intake,
            SenderConfig::from_section(&config.sender),
        )
        .context("Failed to initialize sender")?;

        let metrics = sender.metrics();

        info!(
            poll_interval_secs = config.sender.poll_interval_secs,
            directory_addr = %config.sender.directory_addr,
            node_id = %config.identity.node_id,
            "Relay assembled, entering dispatch loop"
        );

        match sender.run(token).await {
            Ok(()) => Ok(metrics.snapshot()),
            Err(e) => {
                for cause in e.errors() {
                    error!(error = %cause, "Delivery error");
                }
                Err(anyhow::Error::from(e).context("Relay run finished with errors"))
            }
        }
    }
}

/// Load a JSON seed file into the store.
///
/// The file holds an array of `{satellite, payload, signature}` objects with
/// payload and signature as plain strings.
fn seed_store(store: &MemoryStore, path: &PathBuf) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read agreements from {}", path.display()))?;
    let seeds: Vec<SeedAgreement> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse agreements from {}", path.display()))?;

    let count = seeds.len();
    for seed in seeds {
        store.add(
            SatelliteId::new(&seed.satellite),
            Agreement::new(seed.payload.into_bytes(), seed.signature.into_bytes()),
        );
    }
    Ok(count)
}
