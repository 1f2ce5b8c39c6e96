//! In-memory agreement store.
//!
//! The reference store used by the CLI and every test harness. A record
//! stays in the map until deleted by its exact signature; listings clone
//! the current state, so a listing racing a delete simply re-lists the
//! not-yet-deleted record (the intake side settles idempotently).

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use tracing::{debug, trace};

use contracts::{Agreement, AgreementStore, ContractError, SatelliteId};

/// Mutex-guarded in-memory agreement store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pending: Mutex<HashMap<SatelliteId, Vec<Agreement>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one pending agreement for a satellite.
    ///
    /// Records are appended, so listing order per satellite is insertion
    /// order.
    pub fn add(&self, satellite: SatelliteId, agreement: Agreement) {
        let mut pending = self.pending.lock().unwrap();
        trace!(satellite = %satellite, "agreement added");
        pending.entry(satellite).or_default().push(agreement);
    }

    /// Total number of pending records across all satellites.
    pub fn pending_count(&self) -> usize {
        let pending = self.pending.lock().unwrap();
        pending.values().map(Vec::len).sum()
    }

    /// Number of pending records for one satellite.
    pub fn count_for(&self, satellite: &str) -> usize {
        let pending = self.pending.lock().unwrap();
        pending.get(satellite).map_or(0, Vec::len)
    }
}

impl AgreementStore for MemoryStore {
    async fn pending_by_satellite(
        &self,
    ) -> Result<HashMap<SatelliteId, Vec<Agreement>>, ContractError> {
        let pending = self.pending.lock().unwrap();
        Ok(pending
            .iter()
            .filter(|(_, agreements)| !agreements.is_empty())
            .map(|(satellite, agreements)| (satellite.clone(), agreements.clone()))
            .collect())
    }

    async fn delete_by_signature(&self, signature: &Bytes) -> Result<(), ContractError> {
        let mut pending = self.pending.lock().unwrap();
        for agreements in pending.values_mut() {
            if let Some(position) = agreements.iter().position(|a| &a.signature == signature) {
                agreements.remove(position);
                debug!("agreement deleted by signature");
                return Ok(());
            }
        }
        // Already settled by a concurrent task; nothing to do.
        trace!("delete for absent signature, ignoring");
        Ok(())
    }
}
