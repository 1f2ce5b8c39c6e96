//! Group builder - one dispatch cycle's worth of work.
//!
//! Runs inside the tick-driven producer task. A store listing failure is
//! recorded and the whole tick skipped; a transient read error must never
//! take the periodic loop down.

use std::sync::Arc;

use async_channel::Sender;
use tracing::{debug, instrument};

use contracts::{AgreementGroup, AgreementStore};

use crate::error_log::ErrorLog;
use crate::metrics::SenderMetrics;

pub(crate) struct GroupBuilder<S> {
    store: Arc<S>,
    error_log: Arc<ErrorLog>,
    metrics: Arc<SenderMetrics>,
}

impl<S> GroupBuilder<S>
where
    S: AgreementStore + Send + Sync,
{
    pub(crate) fn new(store: Arc<S>, error_log: Arc<ErrorLog>, metrics: Arc<SenderMetrics>) -> Self {
        Self {
            store,
            error_log,
            metrics,
        }
    }

    /// Build this tick's groups and push them one at a time into the hand-off
    /// channel. The channel has depth 1, so a slow dispatch loop blocks this
    /// cycle here - the intended backpressure valve.
    #[instrument(name = "build_groups", skip(self, tx))]
    pub(crate) async fn run_cycle(&self, tx: &Sender<AgreementGroup>) {
        self.metrics.inc_ticks();

        let groups = match self.store.pending_by_satellite().await {
            Ok(groups) => groups,
            Err(e) => {
                // Fail-soft: skip this tick, records stay pending
                self.error_log.record(e);
                return;
            }
        };

        debug!(satellites = groups.len(), "pending agreements listed");
        observability::record_tick(groups.len());

        for (satellite, agreements) in groups {
            if agreements.is_empty() {
                continue;
            }
            let group = AgreementGroup::new(satellite, agreements);
            if tx.send(group).await.is_err() {
                // Dispatch loop is gone; nothing left to hand groups to
                return;
            }
        }
    }
}
