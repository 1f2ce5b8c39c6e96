//! Delivery task - one group, one satellite, one stream.
//!
//! Every failure is recorded into the error log and aborts only this task;
//! records that were not settled stay in the store and are picked up again
//! by a later tick.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use contracts::{
    AgreementGroup, AgreementMessage, AgreementStore, ContractError, IdentityProvider,
    IntakeClient, IntakeStream, NodeDirectory,
};

use crate::error_log::ErrorLog;
use crate::metrics::SenderMetrics;

/// Deliver one agreement group to its satellite and reconcile the store
/// against the settlement summary.
#[instrument(
    name = "delivery_task",
    skip_all,
    fields(satellite = %group.satellite, agreements = group.len())
)]
pub(crate) async fn deliver<S, D, I, C>(
    group: AgreementGroup,
    store: Arc<S>,
    directory: Arc<D>,
    identity: Arc<I>,
    intake: Arc<C>,
    error_log: Arc<ErrorLog>,
    metrics: Arc<SenderMetrics>,
) where
    S: AgreementStore + Send + Sync,
    D: NodeDirectory + Send + Sync,
    I: IdentityProvider,
    C: IntakeClient + Send + Sync,
{
    info!(
        satellite = %group.satellite,
        agreements = group.len(),
        "sending agreements to satellite"
    );

    let addr = match directory.resolve(&group.satellite).await {
        Ok(addr) => addr,
        Err(e) => {
            error_log.record(e);
            metrics.inc_deliveries_failed();
            observability::record_delivery_outcome(&group.satellite, 0, 0, true);
            return;
        }
    };

    let credentials = match identity.credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            error_log.record(e);
            metrics.inc_deliveries_failed();
            observability::record_delivery_outcome(&group.satellite, 0, 0, true);
            return;
        }
    };

    let mut stream = match intake.open(addr, credentials).await {
        Ok(stream) => stream,
        Err(e) => {
            error_log.record(e);
            metrics.inc_deliveries_failed();
            observability::record_delivery_outcome(&group.satellite, 0, 0, true);
            return;
        }
    };

    // Send in listing order; the first failure stops the remainder of this
    // group. Whatever already went out is still reconciled below.
    let mut send_failed = false;
    for (index, agreement) in group.agreements.iter().enumerate() {
        match stream.send(AgreementMessage::from(agreement)).await {
            Ok(()) => metrics.inc_agreements_sent(),
            Err(e) => {
                error_log.record(ContractError::IntakeSend {
                    satellite: group.satellite.clone(),
                    index,
                    message: e.to_string(),
                });
                metrics.inc_deliveries_failed();
                send_failed = true;
                break;
            }
        }
    }

    let summary = match stream.close_and_recv().await {
        Ok(summary) => summary,
        Err(e) => {
            // Without a summary, outcomes are unknown; leave every record
            // of this group pending for the next attempt.
            error_log.record(ContractError::IntakeClose {
                satellite: group.satellite.clone(),
                message: e.to_string(),
            });
            if !send_failed {
                metrics.inc_deliveries_failed();
            }
            observability::record_delivery_outcome(&group.satellite, 0, 0, true);
            return;
        }
    };

    observability::record_delivery_outcome(
        &group.satellite,
        summary.accepted,
        summary.rejected.len(),
        send_failed,
    );
    debug!(
        satellite = %group.satellite,
        accepted = summary.accepted,
        rejected = summary.rejected.len(),
        "settlement summary received"
    );

    // Best-effort reconciliation: one failed deletion must not block the
    // others.
    for &index in &summary.rejected {
        // try_from rather than `as`: a truncating cast could alias a valid
        // position on 32-bit targets instead of landing here.
        let Some(agreement) = usize::try_from(index)
            .ok()
            .and_then(|index| group.agreements.get(index))
        else {
            error_log.record(ContractError::protocol(format!(
                "summary index {index} out of range for batch of {}",
                group.len()
            )));
            continue;
        };
        match store.delete_by_signature(&agreement.signature).await {
            Ok(()) => metrics.inc_records_deleted(),
            Err(e) => {
                warn!(satellite = %group.satellite, index, "deletion failed during reconciliation");
                error_log.record(e);
            }
        }
    }
}
