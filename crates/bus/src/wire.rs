// SPDX-License-Identifier: MIT

//! Length-prefixed JSON framing: 4-byte big-endian length prefix + JSON
//! payload. Used by [`crate::mock::MockBus`]'s internal transport and by any
//! real adapter built against [`crate::BusClient`]/[`crate::ObjectServer`].

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("serializing message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("message of {0} bytes exceeds the framing limit")]
    TooLarge(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maximum framed message size: guards against a corrupt length prefix
/// forcing an unbounded allocation.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;

/// Serialize `value` to raw JSON bytes (no length prefix).
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize raw JSON bytes into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write `data` prefixed with its 4-byte big-endian length.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLarge(data.len()));
    }
    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message, returning the raw payload bytes.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_LEN {
        return Err(ProtocolError::TooLarge(len));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}
