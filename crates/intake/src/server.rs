//! IntakeServer - in-process satellite intake endpoint
//!
//! Used by integration tests and demos as the remote end of the protocol.
//! Settlement is idempotent: a signature that already arrived in an earlier
//! batch is accepted again without side effects, which is what lets the
//! sender tolerate overlapping ticks resending the same record.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use contracts::{AgreementMessage, ContractError, SettlementSummary};

use crate::wire::{self, IntakeFrame};

#[derive(Debug, Default)]
struct IntakeState {
    /// Every message that arrived, in arrival order, across all batches
    received: Mutex<Vec<AgreementMessage>>,
    /// Signatures settled so far (duplicates are re-accepted silently)
    settled: Mutex<HashSet<Bytes>>,
    /// Signatures to mark rejected in any summary
    reject: Mutex<HashSet<Bytes>>,
}

/// Scriptable intake endpoint listening on a loopback port.
pub struct IntakeServer {
    local_addr: SocketAddr,
    state: Arc<IntakeState>,
    accept_handle: JoinHandle<()>,
}

impl IntakeServer {
    /// Bind to an ephemeral loopback port and start accepting.
    pub async fn bind() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local_addr = listener.local_addr()?;
        let state = Arc::new(IntakeState::default());

        let accept_state = Arc::clone(&state);
        let accept_handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        debug!(peer = %peer, "intake connection accepted");
                        let conn_state = Arc::clone(&accept_state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, conn_state).await {
                                warn!(peer = %peer, error = %e, "intake connection ended");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "intake accept failed");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            local_addr,
            state,
            accept_handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Mark a signature so every future summary rejects its position.
    pub fn reject_signature(&self, signature: impl Into<Bytes>) {
        self.state.reject.lock().unwrap().insert(signature.into());
    }

    /// Everything received so far, across all connections.
    pub fn received(&self) -> Vec<AgreementMessage> {
        self.state.received.lock().unwrap().clone()
    }

    /// Signatures received so far, in arrival order.
    pub fn received_signatures(&self) -> Vec<Bytes> {
        self.state
            .received
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.signature.clone())
            .collect()
    }
}

impl Drop for IntakeServer {
    fn drop(&mut self) {
        self.accept_handle.abort();
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    state: Arc<IntakeState>,
) -> Result<(), ContractError> {
    let hello: IntakeFrame = wire::read_frame(&mut stream).await?;
    match hello {
        IntakeFrame::Hello(credentials) if !credentials.token.is_empty() => {
            debug!(node_id = %credentials.node_id, "intake hello");
        }
        IntakeFrame::Hello(_) => {
            // Unauthenticated dial: drop without a summary.
            warn!("intake hello with empty token, closing");
            return Ok(());
        }
        other => {
            return Err(ContractError::protocol(format!(
                "expected hello, got {other:?}"
            )));
        }
    }

    let mut batch: Vec<AgreementMessage> = Vec::new();
    loop {
        let frame: IntakeFrame = wire::read_frame(&mut stream).await?;
        match frame {
            IntakeFrame::Agreement(message) => batch.push(message),
            IntakeFrame::Done => break,
            IntakeFrame::Hello(_) => {
                return Err(ContractError::protocol("unexpected second hello"));
            }
        }
    }

    let summary = settle(&state, &batch);
    wire::write_frame(&mut stream, &summary).await?;
    Ok(())
}

/// Settle one batch: record arrivals, mark scripted rejections positionally.
fn settle(state: &IntakeState, batch: &[AgreementMessage]) -> SettlementSummary {
    let reject = state.reject.lock().unwrap();
    let mut settled = state.settled.lock().unwrap();
    let mut received = state.received.lock().unwrap();

    let mut summary = SettlementSummary::default();
    for (index, message) in batch.iter().enumerate() {
        received.push(message.clone());
        if reject.contains(&message.signature) {
            summary.rejected.push(index as u64);
        } else {
            // Duplicate signatures settle again without side effects.
            settled.insert(message.signature.clone());
            summary.accepted += 1;
        }
    }
    summary
}
