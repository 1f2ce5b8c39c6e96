//! Wire framing - length-prefixed bincode frames.
//!
//! Every message in either direction is a u32 big-endian length followed by
//! a bincode body. A frame above `MAX_FRAME_LEN` is a protocol error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use contracts::{AgreementMessage, ContractError, DialCredentials};

/// Upper bound on a single wire frame.
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// Client-to-satellite frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IntakeFrame {
    /// Credentials, sent once immediately after connect
    Hello(DialCredentials),
    /// One agreement of the batch
    Agreement(AgreementMessage),
    /// End of batch; the satellite answers with a settlement summary
    Done,
}

/// Write one length-prefixed bincode frame.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), ContractError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = bincode::serialize(value)
        .map_err(|e| ContractError::protocol(format!("encode error: {e}")))?;
    if body.len() > MAX_FRAME_LEN {
        return Err(ContractError::protocol(format!(
            "frame too large: {} bytes (max {MAX_FRAME_LEN})",
            body.len()
        )));
    }

    writer.write_u32(body.len() as u32).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed bincode frame.
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
    bincode::deserialize(&body).map_err(|e| ContractError::protocol(format!("decode error: {e}")))
}
