//! NodeDirectory trait - satellite address lookup

use std::net::SocketAddr;

use crate::{ContractError, SatelliteId};

/// Directory service that maps a satellite id to its current network address.
///
/// Resolution is performed once per delivery attempt; a satellite that moved
/// between ticks is simply resolved again on the next cycle.
#[trait_variant::make(NodeDirectory: Send)]
pub trait LocalNodeDirectory {
    /// Resolve a satellite id to a dialable address.
    async fn resolve(&self, satellite: &SatelliteId) -> Result<SocketAddr, ContractError>;
}
