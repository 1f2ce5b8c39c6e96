//! Directory wire format - length-prefixed JSON request/response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use contracts::ContractError;

/// Upper bound on a single directory frame.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Lookup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub satellite: String,
}

/// Lookup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// Resolved address (host:port), absent on failure
    pub address: Option<String>,
    /// Failure reason, absent on success
    pub error: Option<String>,
}

pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), ContractError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(value)
        .map_err(|e| ContractError::protocol(format!("encode error: {e}")))?;
    writer.write_u32(body.len() as u32).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R, T>(reader: &mut R) -> Result<T, ContractError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let len = reader.read_u32().await? as usize;
    if len > MAX_FRAME_LEN {
        return Err(ContractError::protocol(format!(
            "frame too large: {len} bytes (max {MAX_FRAME_LEN})"
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    serde_json::from_slice(&body)
        .map_err(|e| ContractError::protocol(format!("decode error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_roundtrip() {
        let (mut client, mut server) = tokio::io::duplex(256);

        let request = ResolveRequest {
            satellite: "sat-1".to_string(),
        };
        write_frame(&mut client, &request).await.unwrap();

        let read: ResolveRequest = read_frame(&mut server).await.unwrap();
        assert_eq!(read.satellite, "sat-1");
    }
}
