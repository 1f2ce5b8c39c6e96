//! AgreementSender - facade and dispatch loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use contracts::{
    AgreementGroup, AgreementStore, IdentityProvider, IntakeClient, NodeDirectory, SenderSection,
    Ticker,
};

use crate::builder::GroupBuilder;
use crate::delivery::deliver;
use crate::error::SenderError;
use crate::error_log::ErrorLog;
use crate::metrics::SenderMetrics;
use crate::tick::IntervalTicker;

/// Sender configuration
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Time between dispatch cycles
    pub poll_interval: Duration,
}

impl SenderConfig {
    pub fn from_section(section: &SenderSection) -> Self {
        Self {
            poll_interval: section.poll_interval(),
        }
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(contracts::DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

/// The periodic agreement dispatcher.
///
/// Composes the durable store, the satellite directory, the node identity,
/// and the intake client. `run` blocks until its cancellation token fires
/// and then reports everything the error log accumulated.
pub struct AgreementSender<S, D, I, C> {
    store: Arc<S>,
    directory: Arc<D>,
    identity: Arc<I>,
    intake: Arc<C>,
    config: SenderConfig,
    error_log: Arc<ErrorLog>,
    metrics: Arc<SenderMetrics>,
}

impl<S, D, I, C> AgreementSender<S, D, I, C>
where
    S: AgreementStore + Send + Sync + 'static,
    D: NodeDirectory + Send + Sync + 'static,
    I: IdentityProvider + 'static,
    C: IntakeClient + Send + Sync + 'static,
    C::Stream: Send,
{
    /// Compose a sender.
    ///
    /// Collaborator construction failures (a directory client with a bad
    /// configured address, unusable identity material) belong to the caller
    /// and happen before this; here only the sender's own configuration can
    /// still be rejected.
    pub fn initialize(
        store: S,
        directory: D,
        identity: I,
        intake: C,
        config: SenderConfig,
    ) -> Result<Self, SenderError> {
        if config.poll_interval.is_zero() {
            return Err(SenderError::config("poll interval must be non-zero"));
        }

        Ok(Self {
            store: Arc::new(store),
            directory: Arc::new(directory),
            identity: Arc::new(identity),
            intake: Arc::new(intake),
            config,
            error_log: Arc::new(ErrorLog::new()),
            metrics: Arc::new(SenderMetrics::new()),
        })
    }

    /// Shared metrics handle, safe to keep across the run.
    pub fn metrics(&self) -> Arc<SenderMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run until cancellation, polling on the configured interval.
    pub async fn run(self, token: CancellationToken) -> Result<(), SenderError> {
        let ticker = IntervalTicker::new(self.config.poll_interval);
        self.run_with_ticker(ticker, token).await
    }

    /// Run until cancellation with an injected tick source.
    ///
    /// Returns as soon as cancellation is observed, without joining in-flight
    /// delivery tasks. Errors those tasks record after this point are lost;
    /// the tasks themselves observe the same token at their network calls and
    /// wind down shortly after.
    #[instrument(name = "sender_run", skip_all)]
    pub async fn run_with_ticker<T>(
        self,
        ticker: T,
        token: CancellationToken,
    ) -> Result<(), SenderError>
    where
        T: Ticker + Send + 'static,
    {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "agreement sender starting up"
        );

        // Depth 1: at most one group buffered beyond what is dispatching
        let (tx, rx) = async_channel::bounded::<AgreementGroup>(1);

        let builder = GroupBuilder::new(
            Arc::clone(&self.store),
            Arc::clone(&self.error_log),
            Arc::clone(&self.metrics),
        );
        let producer_token = token.clone();
        let producer = tokio::spawn(async move {
            let mut ticker = ticker;
            loop {
                tokio::select! {
                    _ = producer_token.cancelled() => break,
                    tick = ticker.tick() => {
                        if tick.is_none() {
                            break;
                        }
                        builder.run_cycle(&tx).await;
                        if tx.is_closed() {
                            break;
                        }
                    }
                }
            }
        });

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("agreement sender shutting down");
                    break;
                }
                group = rx.recv() => match group {
                    Ok(group) => self.spawn_delivery(group, &token),
                    Err(_) => {
                        // Tick source exhausted and channel drained
                        debug!("group channel closed, stopping");
                        break;
                    }
                }
            }
        }

        // Unblock a producer stuck on a full channel, then stop it
        drop(rx);
        producer.abort();

        let errors = self.error_log.drain();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SenderError::Aggregate { errors })
        }
    }

    /// Launch one delivery task and keep going; slow satellites must never
    /// block the loop or each other.
    fn spawn_delivery(&self, group: AgreementGroup, token: &CancellationToken) {
        self.metrics.inc_groups_dispatched();
        observability::record_group_dispatched(&group.satellite, group.len());

        let store = Arc::clone(&self.store);
        let directory = Arc::clone(&self.directory);
        let identity = Arc::clone(&self.identity);
        let intake = Arc::clone(&self.intake);
        let error_log = Arc::clone(&self.error_log);
        let metrics = Arc::clone(&self.metrics);
        let token = token.clone();

        tokio::spawn(async move {
            let delivery = deliver(group, store, directory, identity, intake, error_log, metrics);
            if token.run_until_cancelled(delivery).await.is_none() {
                debug!("delivery task aborted by shutdown");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick::ManualTicker;
    use bytes::Bytes;
    use directory::MockDirectory;
    use intake::MockIntake;
    use store::MemoryStore;
    use tokio::time::{sleep, timeout, Duration};

    use contracts::{Agreement, NodeIdentity};

    fn agreement(payload: &str, signature: &str) -> Agreement {
        Agreement::new(payload.as_bytes().to_vec(), signature.as_bytes().to_vec())
    }

    fn sender_with(
        store: MemoryStore,
        directory: MockDirectory,
        intake: MockIntake,
    ) -> AgreementSender<MemoryStore, MockDirectory, NodeIdentity, MockIntake> {
        AgreementSender::initialize(
            store,
            directory,
            NodeIdentity::new("node-1", "secret"),
            intake,
            SenderConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_initialize_rejects_zero_interval() {
        let result = AgreementSender::initialize(
            MemoryStore::new(),
            MockDirectory::new(),
            NodeIdentity::new("node-1", "secret"),
            MockIntake::new(),
            SenderConfig {
                poll_interval: Duration::ZERO,
            },
        );
        assert!(matches!(result, Err(SenderError::Config { .. })));
    }

    #[tokio::test]
    async fn test_run_returns_promptly_on_cancellation() {
        let (_tick, ticker) = ManualTicker::new();
        let sender = sender_with(MemoryStore::new(), MockDirectory::new(), MockIntake::new());

        let token = CancellationToken::new();
        token.cancel();

        let result = timeout(Duration::from_millis(100), sender.run_with_ticker(ticker, token))
            .await
            .expect("run did not observe cancellation in time");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_tick_dispatches_and_reports_clean_run() {
        let store = MemoryStore::new();
        store.add("sat-1".into(), agreement("p0", "s0"));

        let directory = MockDirectory::new();
        directory.register("sat-1".into(), "127.0.0.1:9999".parse().unwrap());

        let intake = MockIntake::new();

        let (tick, ticker) = ManualTicker::new();
        let sender = sender_with(store, directory, intake.clone());
        let metrics = sender.metrics();

        let token = CancellationToken::new();
        let run = tokio::spawn(sender.run_with_ticker(ticker, token.clone()));

        tick.fire();
        // Wait for the delivery task to finish its exchange
        for _ in 0..50 {
            if intake.sent().len() == 1 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(intake.sent().len(), 1);
        assert_eq!(intake.sent()[0].signature, Bytes::from_static(b"s0"));

        token.cancel();
        let result = run.await.unwrap();
        assert!(result.is_ok());
        assert_eq!(metrics.ticks(), 1);
        assert_eq!(metrics.groups_dispatched(), 1);
    }

    #[tokio::test]
    async fn test_delivery_errors_surface_in_combined_result() {
        let store = MemoryStore::new();
        store.add("sat-ghost".into(), agreement("p0", "s0"));

        // Directory knows nothing about sat-ghost
        let intake = MockIntake::new();
        let (tick, ticker) = ManualTicker::new();
        let sender = sender_with(store, MockDirectory::new(), intake.clone());

        let token = CancellationToken::new();
        let run = tokio::spawn(sender.run_with_ticker(ticker, token.clone()));

        tick.fire();
        sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = run.await.unwrap();
        let err = result.unwrap_err();
        assert_eq!(err.errors().len(), 1);
        // Resolution failed, so no stream was ever opened
        assert_eq!(intake.open_count(), 0);
    }

    #[tokio::test]
    async fn test_overlapping_ticks_relist_unsettled_records() {
        let store = MemoryStore::new();
        store.add("sat-1".into(), agreement("p0", "s0"));

        let directory = MockDirectory::new();
        directory.register("sat-1".into(), "127.0.0.1:9999".parse().unwrap());

        let intake = MockIntake::new();

        let (tick, ticker) = ManualTicker::new();
        let sender = sender_with(store, directory, intake.clone());

        let token = CancellationToken::new();
        let run = tokio::spawn(sender.run_with_ticker(ticker, token.clone()));

        // The record is never deleted (nothing rejected), so a second tick
        // re-lists and resends it; the intake side must absorb duplicates.
        tick.fire();
        tick.fire();
        for _ in 0..50 {
            if intake.sent().len() == 2 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(intake.sent().len(), 2);
        assert_eq!(intake.sent()[0].signature, intake.sent()[1].signature);

        token.cancel();
        assert!(run.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_stuck_delivery() {
        let store = MemoryStore::new();
        store.add("sat-1".into(), agreement("p0", "s0"));

        let directory = MockDirectory::new();
        directory.register("sat-1".into(), "127.0.0.1:9999".parse().unwrap());

        // The intake accepts the batch but never returns a summary
        let intake = MockIntake::new();
        intake.hold_close();

        let (tick, ticker) = ManualTicker::new();
        let sender = sender_with(store, directory, intake.clone());

        let token = CancellationToken::new();
        let run = tokio::spawn(sender.run_with_ticker(ticker, token.clone()));

        tick.fire();
        for _ in 0..50 {
            if intake.sent().len() == 1 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(intake.sent().len(), 1);

        // Shutdown must not wait for the parked delivery task
        token.cancel();
        let result = timeout(Duration::from_millis(100), run)
            .await
            .expect("run did not return while a delivery was parked")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_tick_overlapping_stuck_delivery_resends_record() {
        let store = MemoryStore::new();
        store.add("sat-1".into(), agreement("p0", "s0"));

        let directory = MockDirectory::new();
        directory.register("sat-1".into(), "127.0.0.1:9999".parse().unwrap());

        let intake = MockIntake::new();
        intake.hold_close();

        let (tick, ticker) = ManualTicker::new();
        let sender = sender_with(store, directory, intake.clone());

        let token = CancellationToken::new();
        let run = tokio::spawn(sender.run_with_ticker(ticker, token.clone()));

        tick.fire();
        for _ in 0..50 {
            if intake.sent().len() == 1 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(intake.sent().len(), 1);

        // The first delivery is still parked at close, so the record is still
        // pending; the next cycle must re-list it and open a second stream
        tick.fire();
        for _ in 0..50 {
            if intake.sent().len() == 2 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(intake.sent().len(), 2);
        assert_eq!(intake.sent()[0].signature, intake.sent()[1].signature);
        assert_eq!(intake.open_count(), 2);

        token.cancel();
        let result = timeout(Duration::from_millis(100), run)
            .await
            .expect("run did not return while deliveries were parked")
            .unwrap();
        assert!(result.is_ok());
    }
}
