//! Intake protocol traits - client-streaming agreement delivery
//!
//! A delivery task opens one stream per satellite, sends every agreement in
//! the group as an independent message, half-closes, and receives a single
//! `SettlementSummary` back. Partial failure is expected: the stream may die
//! mid-batch, and the summary may reject a subset of what arrived.

use std::net::SocketAddr;

use crate::{AgreementMessage, ContractError, DialCredentials, SettlementSummary};

/// One open client-streaming exchange with a satellite's intake endpoint.
#[trait_variant::make(IntakeStream: Send)]
pub trait LocalIntakeStream {
    /// Send one agreement message. Messages must be sent in batch order.
    async fn send(&mut self, message: AgreementMessage) -> Result<(), ContractError>;

    /// Half-close the send side and wait for the settlement summary.
    ///
    /// Consumes the stream: there is nothing useful to do with it after the
    /// summary (or the failure to get one).
    async fn close_and_recv(self) -> Result<SettlementSummary, ContractError>;
}

/// Factory for intake streams.
#[trait_variant::make(IntakeClient: Send)]
pub trait LocalIntakeClient {
    type Stream: IntakeStream + Send;

    /// Open a secure stream to a resolved satellite address.
    async fn open(
        &self,
        addr: SocketAddr,
        credentials: DialCredentials,
    ) -> Result<Self::Stream, ContractError>;
}
