//! Mock intake client
//!
//! In-memory `IntakeClient` for unit tests: records every message it is
//! handed and fails on script at open, at the nth send, or at close.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{
    AgreementMessage, ContractError, DialCredentials, IntakeClient, IntakeStream,
    SettlementSummary,
};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct MockState {
    fail_open: AtomicBool,
    fail_close: AtomicBool,
    /// While set, `close_and_recv` parks until `release_close`
    close_held: AtomicBool,
    close_gate: Notify,
    /// Fail the send at this zero-based position within each stream
    fail_send_at: Mutex<Option<usize>>,
    /// Indices to reject in every summary
    reject: Mutex<Vec<u64>>,
    /// Every message successfully sent, across all streams
    sent: Mutex<Vec<AgreementMessage>>,
    opens: AtomicU64,
}

/// Scriptable in-memory intake client.
#[derive(Debug, Clone, Default)]
pub struct MockIntake {
    state: Arc<MockState>,
}

impl MockIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent `open` call.
    pub fn fail_open(&self) {
        self.state.fail_open.store(true, Ordering::SeqCst);
    }

    /// Fail every subsequent `close_and_recv` call.
    pub fn fail_close(&self) {
        self.state.fail_close.store(true, Ordering::SeqCst);
    }

    /// Park every subsequent `close_and_recv` call until [`release_close`].
    ///
    /// [`release_close`]: MockIntake::release_close
    pub fn hold_close(&self) {
        self.state.close_held.store(true, Ordering::SeqCst);
    }

    /// Let parked `close_and_recv` calls proceed.
    pub fn release_close(&self) {
        self.state.close_held.store(false, Ordering::SeqCst);
        self.state.close_gate.notify_waiters();
    }

    /// Fail the send at `index` (zero-based) within each stream.
    pub fn fail_send_at(&self, index: usize) {
        *self.state.fail_send_at.lock().unwrap() = Some(index);
    }

    /// Mark batch positions to reject in every summary.
    pub fn reject_indices(&self, indices: Vec<u64>) {
        *self.state.reject.lock().unwrap() = indices;
    }

    /// Every message successfully sent so far.
    pub fn sent(&self) -> Vec<AgreementMessage> {
        self.state.sent.lock().unwrap().clone()
    }

    /// Number of streams opened so far.
    pub fn open_count(&self) -> u64 {
        self.state.opens.load(Ordering::SeqCst)
    }
}

impl IntakeClient for MockIntake {
    type Stream = MockIntakeStream;

    async fn open(
        &self,
        addr: SocketAddr,
        _credentials: DialCredentials,
    ) -> Result<MockIntakeStream, ContractError> {
        if self.state.fail_open.load(Ordering::SeqCst) {
            return Err(ContractError::connection(
                addr.to_string(),
                "scripted open failure",
            ));
        }
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        Ok(MockIntakeStream {
            state: Arc::clone(&self.state),
            position: 0,
        })
    }
}

/// Stream half of [`MockIntake`].
pub struct MockIntakeStream {
    state: Arc<MockState>,
    position: usize,
}

impl IntakeStream for MockIntakeStream {
    async fn send(&mut self, message: AgreementMessage) -> Result<(), ContractError> {
        if *self.state.fail_send_at.lock().unwrap() == Some(self.position) {
            return Err(ContractError::protocol(format!(
                "scripted send failure at index {}",
                self.position
            )));
        }
        self.position += 1;
        self.state.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn close_and_recv(self) -> Result<SettlementSummary, ContractError> {
        loop {
            // Register before re-checking the flag so a release between the
            // check and the await cannot be missed
            let released = self.state.close_gate.notified();
            if !self.state.close_held.load(Ordering::SeqCst) {
                break;
            }
            released.await;
        }
        if self.state.fail_close.load(Ordering::SeqCst) {
            return Err(ContractError::protocol("scripted close failure"));
        }
        let rejected = self.state.reject.lock().unwrap().clone();
        let accepted = (self.position as u64).saturating_sub(rejected.len() as u64);
        Ok(SettlementSummary { accepted, rejected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn message(signature: &str) -> AgreementMessage {
        AgreementMessage {
            payload: Bytes::from_static(b"p"),
            signature: Bytes::from(signature.as_bytes().to_vec()),
        }
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:7".parse().unwrap()
    }

    fn creds() -> DialCredentials {
        DialCredentials {
            node_id: "n".to_string(),
            token: "t".to_string(),
        }
    }

    #[tokio::test]
    async fn test_scripted_send_failure_stops_at_index() {
        let mock = MockIntake::new();
        mock.fail_send_at(1);

        let mut stream = mock.open(addr(), creds()).await.unwrap();
        stream.send(message("s0")).await.unwrap();
        assert!(stream.send(message("s1")).await.is_err());
        assert_eq!(mock.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_summary_reflects_scripted_rejections() {
        let mock = MockIntake::new();
        mock.reject_indices(vec![0]);

        let mut stream = mock.open(addr(), creds()).await.unwrap();
        stream.send(message("s0")).await.unwrap();
        stream.send(message("s1")).await.unwrap();

        let summary = stream.close_and_recv().await.unwrap();
        assert_eq!(summary.rejected, vec![0]);
        assert_eq!(summary.accepted, 1);
    }

    #[tokio::test]
    async fn test_held_close_parks_until_released() {
        let mock = MockIntake::new();
        mock.hold_close();

        let mut stream = mock.open(addr(), creds()).await.unwrap();
        stream.send(message("s0")).await.unwrap();

        let mut close = std::pin::pin!(stream.close_and_recv());
        let held = tokio::time::timeout(std::time::Duration::from_millis(20), &mut close).await;
        assert!(held.is_err());

        mock.release_close();
        let summary = close.await.unwrap();
        assert_eq!(summary.accepted, 1);
    }
}
