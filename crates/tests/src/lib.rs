//! # Integration Tests
//!
//! End-to-end tests wiring the real pieces together: the in-memory store,
//! a directory server, TCP intake endpoints, and the sender's dispatch
//! loop driven by a manual tick source.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::SatelliteId::new("sat-1");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use tokio::time::sleep;
    use tokio_util::sync::CancellationToken;

    use contracts::{Agreement, NodeIdentity, SatelliteId};
    use directory::{DirectoryClient, DirectoryServer};
    use intake::{IntakeServer, TcpIntakeClient};
    use sender::{AgreementSender, ManualTicker, SenderConfig, SenderError, TickHandle};
    use store::MemoryStore;

    fn agreement(payload: &str, signature: &str) -> Agreement {
        Agreement::new(payload.as_bytes().to_vec(), signature.as_bytes().to_vec())
    }

    /// Full stack with a shared store handle and a manual tick source.
    struct Harness {
        directory_server: DirectoryServer,
        tick: TickHandle,
        token: CancellationToken,
        run: tokio::task::JoinHandle<Result<(), SenderError>>,
    }

    impl Harness {
        async fn start(store: Arc<MemoryStore>) -> Self {
            let directory_server = DirectoryServer::bind().await.unwrap();
            let directory_client =
                DirectoryClient::new(&directory_server.local_addr().to_string()).unwrap();

            let sender = AgreementSender::initialize(
                store,
                directory_client,
                NodeIdentity::new("node-1", "secret"),
                TcpIntakeClient::new(),
                SenderConfig::default(),
            )
            .unwrap();

            let (tick, ticker) = ManualTicker::new();
            let token = CancellationToken::new();
            let run = tokio::spawn(sender.run_with_ticker(ticker, token.clone()));

            Self {
                directory_server,
                tick,
                token,
                run,
            }
        }

        /// Fire one tick and wait for the expected state to show up.
        async fn tick_and_wait(&self, ready: impl Fn() -> bool) {
            self.tick.fire();
            for _ in 0..100 {
                if ready() {
                    return;
                }
                sleep(Duration::from_millis(10)).await;
            }
            panic!("condition never satisfied after tick");
        }

        async fn shutdown(self) -> Result<(), SenderError> {
            self.token.cancel();
            self.run.await.unwrap()
        }
    }

    /// All agreements accepted: the batch reaches the satellite in listing
    /// order, the run reports clean, and since the summary rejected nothing
    /// no record is deleted.
    #[tokio::test]
    async fn test_accepted_batch_is_streamed_in_order() {
        let store = Arc::new(MemoryStore::new());
        store.add("sat-1".into(), agreement("alloc-1", "sig-1"));
        store.add("sat-1".into(), agreement("alloc-2", "sig-2"));
        store.add("sat-1".into(), agreement("alloc-3", "sig-3"));

        let intake_server = IntakeServer::bind().await.unwrap();
        let harness = Harness::start(Arc::clone(&store)).await;
        harness
            .directory_server
            .register(SatelliteId::new("sat-1"), intake_server.local_addr());

        harness
            .tick_and_wait(|| intake_server.received().len() == 3)
            .await;

        let signatures = intake_server.received_signatures();
        assert_eq!(
            signatures,
            vec![
                Bytes::from_static(b"sig-1"),
                Bytes::from_static(b"sig-2"),
                Bytes::from_static(b"sig-3"),
            ]
        );

        assert!(harness.shutdown().await.is_ok());
        // Only rejected indices are deleted, so an all-accepted batch
        // stays pending and is resent next cycle.
        assert_eq!(store.pending_count(), 3);
    }

    /// Rejected agreements are the ones whose records get deleted; the
    /// accepted remainder stays pending.
    #[tokio::test]
    async fn test_rejected_agreements_are_deleted() {
        let store = Arc::new(MemoryStore::new());
        store.add("sat-1".into(), agreement("alloc-1", "sig-1"));
        store.add("sat-1".into(), agreement("alloc-2", "sig-2"));
        store.add("sat-1".into(), agreement("alloc-3", "sig-3"));

        let intake_server = IntakeServer::bind().await.unwrap();
        intake_server.reject_signature(Bytes::from_static(b"sig-2"));

        let harness = Harness::start(Arc::clone(&store)).await;
        harness
            .directory_server
            .register(SatelliteId::new("sat-1"), intake_server.local_addr());

        let watched_store = Arc::clone(&store);
        harness
            .tick_and_wait(move || watched_store.pending_count() == 2)
            .await;

        assert!(harness.shutdown().await.is_ok());
        assert_eq!(store.count_for("sat-1"), 2);

        // sig-2 was settled and removed; sig-1 and sig-3 remain
        let groups = pending_groups(&store).await;
        let remaining: Vec<_> = groups["sat-1"].iter().map(|a| a.signature.clone()).collect();
        assert_eq!(
            remaining,
            vec![Bytes::from_static(b"sig-1"), Bytes::from_static(b"sig-3")]
        );
    }

    async fn pending_groups(
        store: &MemoryStore,
    ) -> std::collections::HashMap<SatelliteId, Vec<Agreement>> {
        use contracts::AgreementStore;
        store.pending_by_satellite().await.unwrap()
    }

    /// A satellite whose address refuses connections: one error in the
    /// combined result, the store untouched.
    #[tokio::test]
    async fn test_connection_failure_leaves_store_untouched() {
        let store = Arc::new(MemoryStore::new());
        store.add("sat-1".into(), agreement("alloc-1", "sig-1"));
        store.add("sat-1".into(), agreement("alloc-2", "sig-2"));

        let harness = Harness::start(Arc::clone(&store)).await;
        // Port 1 refuses connections
        harness
            .directory_server
            .register(SatelliteId::new("sat-1"), "127.0.0.1:1".parse().unwrap());

        harness.tick.fire();
        sleep(Duration::from_millis(200)).await;

        let err = harness.shutdown().await.unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(store.pending_count(), 2);
    }

    /// A satellite the directory cannot resolve: the delivery fails before
    /// any connection attempt and other satellites are unaffected.
    #[tokio::test]
    async fn test_unresolved_satellite_does_not_block_others() {
        let store = Arc::new(MemoryStore::new());
        store.add("sat-known".into(), agreement("alloc-1", "sig-1"));
        store.add("sat-ghost".into(), agreement("alloc-2", "sig-2"));

        let intake_server = IntakeServer::bind().await.unwrap();
        let harness = Harness::start(Arc::clone(&store)).await;
        harness
            .directory_server
            .register(SatelliteId::new("sat-known"), intake_server.local_addr());

        harness
            .tick_and_wait(|| intake_server.received().len() == 1)
            .await;

        let err = harness.shutdown().await.unwrap_err();
        assert_eq!(err.errors().len(), 1);

        // The known satellite's agreement arrived despite the ghost's failure
        assert_eq!(
            intake_server.received_signatures(),
            vec![Bytes::from_static(b"sig-1")]
        );
        // Nothing was deleted on either side
        assert_eq!(store.pending_count(), 2);
    }

    /// Records not deleted after a cycle are re-listed and resent; the
    /// intake side settles duplicates without side effects.
    #[tokio::test]
    async fn test_undeleted_records_are_resent_next_cycle() {
        let store = Arc::new(MemoryStore::new());
        store.add("sat-1".into(), agreement("alloc-1", "sig-1"));

        let intake_server = IntakeServer::bind().await.unwrap();
        let harness = Harness::start(Arc::clone(&store)).await;
        harness
            .directory_server
            .register(SatelliteId::new("sat-1"), intake_server.local_addr());

        harness
            .tick_and_wait(|| intake_server.received().len() == 1)
            .await;
        harness
            .tick_and_wait(|| intake_server.received().len() == 2)
            .await;

        assert!(harness.shutdown().await.is_ok());

        // Same signature both times
        assert_eq!(
            intake_server.received_signatures(),
            vec![Bytes::from_static(b"sig-1"), Bytes::from_static(b"sig-1")]
        );
    }

    /// Groups for distinct satellites land on their own endpoints.
    #[tokio::test]
    async fn test_groups_route_to_their_own_satellites() {
        let store = Arc::new(MemoryStore::new());
        store.add("sat-a".into(), agreement("alloc-1", "sig-a1"));
        store.add("sat-b".into(), agreement("alloc-2", "sig-b1"));
        store.add("sat-b".into(), agreement("alloc-3", "sig-b2"));

        let server_a = IntakeServer::bind().await.unwrap();
        let server_b = IntakeServer::bind().await.unwrap();

        let harness = Harness::start(Arc::clone(&store)).await;
        harness
            .directory_server
            .register(SatelliteId::new("sat-a"), server_a.local_addr());
        harness
            .directory_server
            .register(SatelliteId::new("sat-b"), server_b.local_addr());

        harness
            .tick_and_wait(|| server_a.received().len() == 1 && server_b.received().len() == 2)
            .await;

        assert!(harness.shutdown().await.is_ok());
        assert_eq!(
            server_a.received_signatures(),
            vec![Bytes::from_static(b"sig-a1")]
        );
        assert_eq!(
            server_b.received_signatures(),
            vec![Bytes::from_static(b"sig-b1"), Bytes::from_static(b"sig-b2")]
        );
    }

    /// An empty store produces no deliveries and a clean shutdown.
    #[tokio::test]
    async fn test_empty_store_is_a_quiet_cycle() {
        let store = Arc::new(MemoryStore::new());
        let harness = Harness::start(Arc::clone(&store)).await;

        harness.tick.fire();
        sleep(Duration::from_millis(100)).await;

        assert!(harness.shutdown().await.is_ok());
    }
}

#[cfg(test)]
mod config_tests {
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use sender::SenderConfig;

    #[test]
    fn test_loaded_config_drives_sender_settings() {
        let toml = r#"
            [identity]
            node_id = "node-1"
            token = "secret"

            [sender]
            poll_interval_secs = 120
            directory_addr = "127.0.0.1:9000"
        "#;

        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let sender_config = SenderConfig::from_section(&config.sender);
        assert_eq!(sender_config.poll_interval, Duration::from_secs(120));
    }

    #[test]
    fn test_rejected_config_never_reaches_the_sender() {
        let toml = r#"
            [identity]
            node_id = ""
        "#;

        assert!(ConfigLoader::load_from_str(toml, ConfigFormat::Toml).is_err());
    }
}
