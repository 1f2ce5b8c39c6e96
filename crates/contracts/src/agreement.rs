//! Agreement records and delivery batches.
//!
//! An `Agreement` is a signed claim that this node served data for a
//! satellite. The store owns the records; the sender only ever borrows
//! them into transient per-satellite groups for one delivery attempt.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::SatelliteId;

/// One signed bandwidth agreement, as held by the durable store.
///
/// `signature` is unique across the store and is the sole key used for
/// deletion after settlement. The payload bytes are opaque to the relay;
/// only the satellite can verify them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    /// Opaque signed allocation claim
    pub payload: Bytes,

    /// Unique signature identifying this record
    pub signature: Bytes,
}

impl Agreement {
    pub fn new(payload: impl Into<Bytes>, signature: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            signature: signature.into(),
        }
    }
}

/// All pending agreements for one satellite, batched for one delivery attempt.
///
/// Built fresh each tick from the store's grouped listing and consumed by
/// exactly one delivery task. Never persisted, never shared across ticks.
#[derive(Debug, Clone)]
pub struct AgreementGroup {
    /// The satellite that settles this batch
    pub satellite: SatelliteId,

    /// Agreements in store listing order
    pub agreements: Vec<Agreement>,
}

impl AgreementGroup {
    pub fn new(satellite: SatelliteId, agreements: Vec<Agreement>) -> Self {
        Self {
            satellite,
            agreements,
        }
    }

    pub fn len(&self) -> usize {
        self.agreements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }
}

/// Wire form of one agreement, streamed to the intake endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementMessage {
    pub payload: Bytes,
    pub signature: Bytes,
}

impl From<&Agreement> for AgreementMessage {
    fn from(agreement: &Agreement) -> Self {
        Self {
            payload: agreement.payload.clone(),
            signature: agreement.signature.clone(),
        }
    }
}

/// The satellite's one-shot response after a streamed batch.
///
/// `rejected` holds positional indices into the batch as sent, marking the
/// agreements the satellite did not accept. `accepted` is the count of the
/// remainder and is informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Number of agreements the satellite accepted
    pub accepted: u64,

    /// Positions (0-based, in send order) that were not accepted
    pub rejected: Vec<u64>,
}

impl SettlementSummary {
    /// Summary for a batch that was accepted in full.
    pub fn all_accepted(total: u64) -> Self {
        Self {
            accepted: total,
            rejected: Vec::new(),
        }
    }
}
