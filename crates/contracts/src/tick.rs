//! Ticker trait - injectable cycle trigger
//!
//! The sender's polling cadence is driven through this trait instead of a
//! hard-wired timer, so tests can fire ticks without real time passing.

/// Source of dispatch-cycle triggers.
#[trait_variant::make(Ticker: Send)]
pub trait LocalTicker {
    /// Wait for the next tick.
    ///
    /// Returns `None` when the source is exhausted (a manual ticker whose
    /// handle was dropped); an interval ticker never returns `None`.
    async fn tick(&mut self) -> Option<()>;
}
