//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Domain Model
//! - Storage nodes accumulate signed bandwidth agreements in a durable store
//! - Each agreement belongs to exactly one satellite (the payer who settles it)
//! - A record is keyed by its `signature` and lives in the store until deleted

mod agreement;
mod config;
mod directory;
mod error;
mod identity;
mod intake;
mod satellite_id;
mod store;
mod tick;

pub use agreement::*;
pub use config::*;
pub use directory::*;
pub use error::*;
pub use identity::*;
pub use intake::*;
pub use satellite_id::SatelliteId;
pub use store::*;
pub use tick::*;
