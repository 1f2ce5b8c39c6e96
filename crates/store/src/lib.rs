//! # Store
//!
//! Durable agreement store implementations.
//!
//! Responsibilities:
//! - Hold pending agreements until explicitly deleted by signature
//! - Serve grouped listings for the sender's dispatch cycle
//! - Tolerate concurrent deletes racing against a listing

mod memory;

pub use contracts::{Agreement, AgreementStore, SatelliteId};
pub use memory::MemoryStore;
