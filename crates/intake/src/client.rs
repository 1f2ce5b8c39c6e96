//! TcpIntakeClient - client-streaming delivery over TCP

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::{debug, instrument};

use contracts::{
    AgreementMessage, ContractError, DialCredentials, IntakeClient, IntakeStream,
    SettlementSummary,
};

use crate::wire::{self, IntakeFrame};

/// Factory for TCP intake streams.
///
/// Stateless; the credentials travel with every `open` call so one client
/// serves every concurrent delivery task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpIntakeClient;

impl TcpIntakeClient {
    pub fn new() -> Self {
        Self
    }
}

impl IntakeClient for TcpIntakeClient {
    type Stream = TcpIntakeStream;

    #[instrument(name = "intake_open", skip(self, credentials), fields(addr = %addr))]
    async fn open(
        &self,
        addr: SocketAddr,
        credentials: DialCredentials,
    ) -> Result<TcpIntakeStream, ContractError> {
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ContractError::connection(addr.to_string(), e.to_string()))?;

        wire::write_frame(&mut stream, &IntakeFrame::Hello(credentials)).await?;
        debug!(addr = %addr, "intake stream opened");

        Ok(TcpIntakeStream { stream, addr })
    }
}

/// One open exchange with a satellite intake endpoint.
pub struct TcpIntakeStream {
    stream: TcpStream,
    addr: SocketAddr,
}

impl IntakeStream for TcpIntakeStream {
    async fn send(&mut self, message: AgreementMessage) -> Result<(), ContractError> {
        wire::write_frame(&mut self.stream, &IntakeFrame::Agreement(message)).await
    }

    #[instrument(name = "intake_close_and_recv", skip(self), fields(addr = %self.addr))]
    async fn close_and_recv(mut self) -> Result<SettlementSummary, ContractError> {
        wire::write_frame(&mut self.stream, &IntakeFrame::Done).await?;

        let summary: SettlementSummary = wire::read_frame(&mut self.stream).await?;
        debug!(
            accepted = summary.accepted,
            rejected = summary.rejected.len(),
            "settlement summary received"
        );
        Ok(summary)
    }
}
