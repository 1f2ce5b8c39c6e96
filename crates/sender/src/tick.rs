//! Tick sources - wall-clock interval and test-driven manual ticks.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use contracts::Ticker;

/// Wall-clock ticker firing every `period`.
///
/// The first tick fires one full period after creation, matching a cron-like
/// cadence rather than an immediate run. Missed ticks are skipped, not
/// bunched.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> Option<()> {
        self.interval.tick().await;
        Some(())
    }
}

/// Test-driven ticker: fires once per `TickHandle::fire` call.
pub struct ManualTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Sending half of a [`ManualTicker`].
#[derive(Debug, Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicker {
    pub fn new() -> (TickHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TickHandle { tx }, Self { rx })
    }
}

impl TickHandle {
    /// Trigger one tick. Returns false once the ticker is gone.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

impl Ticker for ManualTicker {
    async fn tick(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_ticker_fires_on_demand() {
        let (handle, mut ticker) = ManualTicker::new();
        assert!(handle.fire());
        assert_eq!(ticker.tick().await, Some(()));
    }

    #[tokio::test]
    async fn test_manual_ticker_ends_when_handle_dropped() {
        let (handle, mut ticker) = ManualTicker::new();
        drop(handle);
        assert_eq!(ticker.tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticker_waits_full_period() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(60));

        // Nothing fires before the first period has elapsed
        let early = tokio::time::timeout(Duration::from_secs(59), ticker.tick()).await;
        assert!(early.is_err());

        let due = tokio::time::timeout(Duration::from_secs(2), ticker.tick()).await;
        assert_eq!(due.unwrap(), Some(()));
    }
}
