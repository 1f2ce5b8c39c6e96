//! Mock directory - static in-memory satellite table.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

use contracts::{ContractError, NodeDirectory, SatelliteId};

/// In-memory directory for unit tests; no sockets involved.
#[derive(Debug, Default)]
pub struct MockDirectory {
    table: Mutex<HashMap<SatelliteId, SocketAddr>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or move) a satellite.
    pub fn register(&self, satellite: SatelliteId, addr: SocketAddr) {
        self.table.lock().unwrap().insert(satellite, addr);
    }

    /// Remove a satellite so lookups for it fail.
    pub fn deregister(&self, satellite: &str) {
        self.table.lock().unwrap().remove(satellite);
    }
}

impl NodeDirectory for MockDirectory {
    async fn resolve(&self, satellite: &SatelliteId) -> Result<SocketAddr, ContractError> {
        self.table
            .lock()
            .unwrap()
            .get(satellite.as_str())
            .copied()
            .ok_or_else(|| {
                ContractError::directory_resolve(satellite.clone(), "unknown satellite")
            })
    }
}
