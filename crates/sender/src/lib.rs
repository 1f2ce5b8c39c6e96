//! # Sender
//!
//! Periodic, concurrent agreement dispatcher.
//!
//! Responsibilities:
//! - Each tick, list pending agreements grouped by satellite
//! - Hand each group through a depth-1 channel to the dispatch loop
//! - Deliver each group on its own task; slow satellites never block others
//! - Funnel every failure into a shared error log, reported at shutdown

mod builder;
mod delivery;
mod error;
mod error_log;
mod metrics;
mod sender;
mod tick;

pub use contracts::{AgreementGroup, ContractError};
pub use error::SenderError;
pub use error_log::ErrorLog;
pub use metrics::{SenderMetrics, SenderMetricsSnapshot};
pub use sender::{AgreementSender, SenderConfig};
pub use tick::{IntervalTicker, ManualTicker, TickHandle};
