//! DirectoryServer - in-process directory endpoint for tests and demos.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use contracts::{ContractError, SatelliteId};

use crate::wire::{self, ResolveRequest, ResolveResponse};

/// Directory endpoint with a scriptable satellite table.
pub struct DirectoryServer {
    local_addr: SocketAddr,
    table: Arc<Mutex<HashMap<SatelliteId, SocketAddr>>>,
    accept_handle: JoinHandle<()>,
}

impl DirectoryServer {
    /// Bind to an ephemeral loopback port and start serving lookups.
    pub async fn bind() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let local_addr = listener.local_addr()?;
        let table: Arc<Mutex<HashMap<SatelliteId, SocketAddr>>> = Arc::default();

        let accept_table = Arc::clone(&table);
        let accept_handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        debug!(peer = %peer, "directory connection accepted");
                        let conn_table = Arc::clone(&accept_table);
                        tokio::spawn(async move {
                            if let Err(e) = handle_lookup(stream, conn_table).await {
                                warn!(peer = %peer, error = %e, "directory lookup failed");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "directory accept failed");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            local_addr,
            table,
            accept_handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Register (or move) a satellite.
    pub fn register(&self, satellite: SatelliteId, addr: SocketAddr) {
        self.table.lock().unwrap().insert(satellite, addr);
    }

    /// Remove a satellite so lookups for it fail.
    pub fn deregister(&self, satellite: &str) {
        self.table.lock().unwrap().remove(satellite);
    }
}

impl Drop for DirectoryServer {
    fn drop(&mut self) {
        self.accept_handle.abort();
    }
}

async fn handle_lookup(
    mut stream: TcpStream,
    table: Arc<Mutex<HashMap<SatelliteId, SocketAddr>>>,
) -> Result<(), ContractError> {
    let request: ResolveRequest = wire::read_frame(&mut stream).await?;
    let entry = table
        .lock()
        .unwrap()
        .get(request.satellite.as_str())
        .copied();

    let response = match entry {
        Some(addr) => ResolveResponse {
            address: Some(addr.to_string()),
            error: None,
        },
        None => ResolveResponse {
            address: None,
            error: Some(format!("unknown satellite '{}'", request.satellite)),
        },
    };
    wire::write_frame(&mut stream, &response).await
}
