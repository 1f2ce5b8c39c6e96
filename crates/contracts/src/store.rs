//! AgreementStore trait - durable store interface
//!
//! The store is the single source of truth for pending agreements. It must
//! tolerate concurrent deletes from multiple delivery tasks and a grouped
//! listing racing against them (a record not yet deleted is simply re-listed
//! and resent; the intake side settles idempotently).

use std::collections::HashMap;

use bytes::Bytes;

use crate::{Agreement, ContractError, SatelliteId};

/// Durable agreement store interface
#[trait_variant::make(AgreementStore: Send)]
pub trait LocalAgreementStore {
    /// List every pending agreement, partitioned by satellite.
    ///
    /// Order within each satellite's sequence is the store's listing order
    /// and is preserved end to end through delivery.
    async fn pending_by_satellite(
        &self,
    ) -> Result<HashMap<SatelliteId, Vec<Agreement>>, ContractError>;

    /// Delete one record by its exact signature.
    ///
    /// Deleting a signature that is no longer present is not an error; a
    /// concurrent task may have settled the same record first.
    async fn delete_by_signature(&self, signature: &Bytes) -> Result<(), ContractError>;
}

/// Shared stores delegate, so a caller can keep a handle for inspection
/// while the sender owns its own.
impl<S> AgreementStore for std::sync::Arc<S>
where
    S: AgreementStore + Send + Sync,
{
    async fn pending_by_satellite(
        &self,
    ) -> Result<HashMap<SatelliteId, Vec<Agreement>>, ContractError> {
        S::pending_by_satellite(self).await
    }

    async fn delete_by_signature(&self, signature: &Bytes) -> Result<(), ContractError> {
        S::delete_by_signature(self, signature).await
    }
}
