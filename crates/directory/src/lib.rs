//! # Directory
//!
//! Satellite directory service client.
//!
//! Responsibilities:
//! - Resolve a satellite id to its current network address
//! - Fail fast at construction on a malformed configured endpoint
//! - `MockDirectory` / `DirectoryServer` for tests and demos

mod client;
mod mock;
mod server;
mod wire;

pub use client::DirectoryClient;
pub use contracts::{NodeDirectory, SatelliteId};
pub use mock::MockDirectory;
pub use server::DirectoryServer;
