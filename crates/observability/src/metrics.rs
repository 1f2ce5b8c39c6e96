//! Relay metrics recording helpers.
//!
//! Thin wrappers over the `metrics` macros so call sites stay one-liners and
//! metric names live in one place.

use metrics::{counter, gauge};

use contracts::SatelliteId;

/// Record one dispatch cycle.
pub fn record_tick(pending_satellites: usize) {
    counter!("relay_ticks_total").increment(1);
    gauge!("relay_pending_satellites").set(pending_satellites as f64);
}

/// Record one group handed to a delivery task.
pub fn record_group_dispatched(satellite: &SatelliteId, agreements: usize) {
    counter!("relay_groups_dispatched_total", "satellite" => satellite.to_string()).increment(1);
    gauge!("relay_last_group_size", "satellite" => satellite.to_string()).set(agreements as f64);
}

/// Record a completed (or failed) delivery attempt.
pub fn record_delivery_outcome(satellite: &SatelliteId, accepted: u64, rejected: usize, failed: bool) {
    if failed {
        counter!("relay_deliveries_failed_total", "satellite" => satellite.to_string())
            .increment(1);
        return;
    }
    counter!("relay_agreements_accepted_total", "satellite" => satellite.to_string())
        .increment(accepted);
    if rejected > 0 {
        counter!("relay_agreements_rejected_total", "satellite" => satellite.to_string())
            .increment(rejected as u64);
    }
}
