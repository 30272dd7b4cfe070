//! # Chunked Sender
//!
//! Delivers an encoded receipt over a [`NegotiatedConnection`].
//!
//! ## Transmission Rules
//!
//! - The stream is split into chunks of at most `chunk_size` bytes (512 by
//!   default, a safe single-write size for BLE printer modules)
//! - Chunks are written strictly one after the other; the next write starts
//!   only after the previous one returned
//! - Liveness is checked before every chunk; a dead link aborts at once
//! - A GATT-level write failure switches to the other write mode once and
//!   retries the same chunk. A failure after the switch is final.
//! - A short pause follows every chunk except the last, then a settle delay
//!   lets the printer drain its buffer before the link is torn down

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{GattDevice, NegotiatedConnection, WriteMode};
use crate::error::{ChunkProgress, PrintError, TransportError};
use crate::printer::PrinterProfile;

/// A slice of the stream and its 0-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub bytes: &'a [u8],
}

/// Split `data` into consecutive chunks of at most `size` bytes.
///
/// ```
/// use recibo::transport::chunk;
///
/// let data = vec![0u8; 1300];
/// let chunks = chunk(&data, 512);
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[2].bytes.len(), 276);
/// ```
pub fn chunk(data: &[u8], size: usize) -> Vec<Chunk<'_>> {
    data.chunks(size.max(1))
        .enumerate()
        .map(|(index, bytes)| Chunk { index, bytes })
        .collect()
}

/// Outcome of a completed transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    pub chunks_sent: usize,
    pub total_chunks: usize,
    pub bytes_sent: usize,
    /// Mode in use when the last chunk was written
    pub mode: WriteMode,
    /// Whether the one-time write-mode fallback was used
    pub switched_mode: bool,
}

/// Write `data` to the connection's characteristic.
#[instrument(skip_all, fields(bytes = data.len(), chunk_size = profile.chunk_size))]
pub async fn send<D: GattDevice>(
    conn: &mut NegotiatedConnection<D>,
    data: &[u8],
    profile: &PrinterProfile,
) -> Result<SendReport, PrintError> {
    let chunks = chunk(data, profile.chunk_size);
    let total = chunks.len();
    let mut switched_mode = false;
    let mut bytes_sent = 0;

    debug!(total, mode = ?conn.write_mode, "Sending receipt");

    for c in &chunks {
        let progress = ChunkProgress {
            chunk: c.index + 1,
            total,
        };

        if !conn.device.is_connected().await {
            warn!(%progress, "Printer disconnected, aborting");
            return Err(PrintError::ConnectionLost {
                reason: TransportError::Disconnected.to_string(),
                progress: Some(progress),
            });
        }

        loop {
            let result = conn
                .device
                .write(&conn.characteristic, c.bytes, conn.write_mode)
                .await;

            match result {
                Ok(()) => break,
                Err(TransportError::Disconnected) => {
                    return Err(PrintError::ConnectionLost {
                        reason: TransportError::Disconnected.to_string(),
                        progress: Some(progress),
                    });
                }
                Err(e)
                    if e.is_gatt_failure()
                        && !switched_mode
                        && conn.characteristic.write.supports(conn.write_mode.other()) =>
                {
                    let next = conn.write_mode.other();
                    warn!(%progress, error = %e, from = ?conn.write_mode, to = ?next, "Write failed, switching write mode");
                    conn.write_mode = next;
                    switched_mode = true;
                }
                Err(e) => {
                    return Err(PrintError::WriteFailed {
                        reason: e.to_string(),
                        progress,
                    });
                }
            }
        }

        bytes_sent += c.bytes.len();

        if c.index + 1 < total {
            let pause = profile.chunk_delay(conn.write_mode);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
    }

    let settle = profile.settle_delay();
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    info!(chunks = total, bytes = bytes_sent, mode = ?conn.write_mode, switched_mode, "Receipt sent");

    Ok(SendReport {
        chunks_sent: total,
        total_chunks: total,
        bytes_sent,
        mode: conn.write_mode,
        switched_mode,
    })
}
