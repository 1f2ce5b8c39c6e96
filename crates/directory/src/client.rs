//! DirectoryClient - satellite address lookup over TCP

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::{debug, instrument};

use contracts::{ContractError, NodeDirectory, SatelliteId};

use crate::wire::{self, ResolveRequest, ResolveResponse};

/// Client for the directory service.
///
/// The configured endpoint is parsed at construction, so a bad address is a
/// startup failure rather than one discovered on the first tick.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    endpoint: SocketAddr,
}

impl DirectoryClient {
    /// Create a client for the given `host:port` endpoint.
    pub fn new(endpoint: &str) -> Result<Self, ContractError> {
        let endpoint = endpoint.parse::<SocketAddr>().map_err(|e| {
            ContractError::directory_connection(format!("invalid endpoint '{endpoint}': {e}"))
        })?;
        Ok(Self { endpoint })
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }
}

impl NodeDirectory for DirectoryClient {
    #[instrument(name = "directory_resolve", skip(self), fields(satellite = %satellite))]
    async fn resolve(&self, satellite: &SatelliteId) -> Result<SocketAddr, ContractError> {
        let mut stream = TcpStream::connect(self.endpoint)
            .await
            .map_err(|e| ContractError::directory_connection(e.to_string()))?;

        let request = ResolveRequest {
            satellite: satellite.to_string(),
        };
        wire::write_frame(&mut stream, &request).await?;
        let response: ResolveResponse = wire::read_frame(&mut stream).await?;

        if let Some(error) = response.error {
            return Err(ContractError::directory_resolve(satellite.clone(), error));
        }

        let address = response.address.ok_or_else(|| {
            ContractError::directory_resolve(satellite.clone(), "empty response")
        })?;
        let address = address.parse::<SocketAddr>().map_err(|e| {
            ContractError::directory_resolve(
                satellite.clone(),
                format!("unparseable address '{address}': {e}"),
            )
        })?;

        debug!(satellite = %satellite, address = %address, "satellite resolved");
        Ok(address)
    }
}
