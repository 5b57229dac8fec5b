//! NDJSON framing
//!
//! Every message on the socket is a single JSON document terminated by
//! `\n`. Blank lines are ignored on read.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{IpcError, IpcResult};

/// Serialize `message` into one newline-terminated line
pub fn encode_line<T: Serialize>(message: &T) -> IpcResult<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_line<T: DeserializeOwned>(line: &str) -> IpcResult<T> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Read the next non-blank line. `Ok(None)` means the peer closed the stream.
pub async fn read_line<R>(reader: &mut R, buf: &mut String) -> IpcResult<Option<()>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        buf.clear();
        if reader.read_line(buf).await? == 0 {
            return Ok(None);
        }
        if !buf.trim().is_empty() {
            return Ok(Some(()));
        }
    }
}

/// Read and decode the next message, failing on EOF
pub async fn read_message<R, T>(reader: &mut R) -> IpcResult<T>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut buf = String::new();
    match read_line(reader, &mut buf).await? {
        Some(()) => decode_line(&buf),
        None => Err(IpcError::ConnectionClosed),
    }
}

pub async fn write_message<W, T>(writer: &mut W, message: &T) -> IpcResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let line = encode_line(message)?;
    writer.write_all(line.as_bytes()).await?;
    Ok(())
}
