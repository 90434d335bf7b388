//! Low-level socket I/O operations with timeout handling.

use crate::error::{AppError, Result};
use crate::report::format_hex;
use crate::wms::RESPONSE_LEN;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Write a command frame with timeout.
pub(crate) async fn write_frame<S>(stream: &mut S, frame: &[u8], timeout_duration: Duration) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    debug!("TX ({} bytes): {}", frame.len(), format_hex(frame));
    timeout(timeout_duration, stream.write_all(frame))
        .await
        .map_err(|_| AppError::DeviceTimeout("Write timeout".to_string()))?
        .map_err(|e| {
            error!("Write failed: {e}");
            AppError::TcpConnectionFailed(format!("Write failed: {e}"))
        })?;
    Ok(())
}

/// Read one status reply.
///
/// Reads until 20 bytes arrived or the peer closed the connection. A reply cut
/// short is returned as-is so the decoder can reject it.
pub(crate) async fn read_reply<S>(stream: &mut S, timeout_duration: Duration) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut data = vec![0u8; RESPONSE_LEN];
    let mut received = 0;

    while received < RESPONSE_LEN {
        match timeout(timeout_duration, stream.read(&mut data[received..])).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                received += n;
                debug!("RX chunk: {n} bytes, total {received}/{RESPONSE_LEN}");
            }
            Ok(Err(e)) => {
                error!("Read failed: {e}");
                return Err(AppError::TcpConnectionFailed(format!("Read failed: {e}")));
            }
            Err(_) => {
                error!("Read timeout after {received}/{RESPONSE_LEN} bytes");
                return Err(AppError::DeviceTimeout(format!(
                    "Read timeout after {received}/{RESPONSE_LEN} bytes"
                )));
            }
        }
    }

    if received == 0 {
        return Err(AppError::TcpConnectionFailed(
            "Connection closed before reply".to_string(),
        ));
    }
    if received < RESPONSE_LEN {
        warn!("Connection closed after {received}/{RESPONSE_LEN} bytes");
    }

    data.truncate(received);
    debug!("RX ({} bytes): {}", data.len(), format_hex(&data));
    Ok(data)
}
