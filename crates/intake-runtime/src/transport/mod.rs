//! # Transport
//!
//! JSON lines in on a reader, JSON lines out on a writer. Each inbound line
//! is routed on its own task; a single writer task serializes the output.
//!
//! At most `max_in_flight` messages are routed at once. Reading pauses while
//! the cap is reached, and finished tasks are reaped as they complete.

pub mod codec;
pub mod replies;
pub mod router;

pub use codec::{decode_line, encode_line, CodecError, InboundMessage, OutboundLine};
pub use router::{should_discard, Command, Router};

use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const OUTBOUND_BUFFER: usize = 256;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to read inbound stream: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write outbound stream: {0}")]
    Write(#[source] std::io::Error),

    #[error("Writer task terminated unexpectedly: {0}")]
    Writer(String),
}

/// Counters for one `serve` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    /// Lines decoded and routed.
    pub routed: u64,
    /// Lines that could not be decoded.
    pub rejected: u64,
    /// Lines written.
    pub written: u64,
    /// Most messages routed concurrently.
    pub peak_in_flight: usize,
}

/// Serve until the reader hits EOF or `shutdown` fires, then drain in-flight
/// messages. Returns the writer so callers can inspect or flush it.
///
/// A `max_in_flight` of zero is treated as one.
pub async fn serve<R, W>(
    router: Arc<Router>,
    reader: R,
    writer: W,
    mut shutdown: watch::Receiver<bool>,
    max_in_flight: usize,
) -> Result<(ServeSummary, W), TransportError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::channel::<OutboundLine>(OUTBOUND_BUFFER);
    let writer_task = tokio::spawn(write_lines(writer, out_rx));

    let max_in_flight = max_in_flight.max(1);
    let mut summary = ServeSummary::default();
    let mut in_flight = JoinSet::new();
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Shutdown requested; no longer reading input");
                    break;
                }
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_task_result(joined);
            }
            next = lines.next_line(), if in_flight.len() < max_in_flight => {
                let Some(line) = next.map_err(TransportError::Read)? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let msg = match decode_line(&line) {
                    Ok(msg) => msg,
                    Err(err) => {
                        warn!(error = %err, "Rejected inbound line");
                        summary.rejected += 1;
                        continue;
                    }
                };
                summary.routed += 1;

                let router = Arc::clone(&router);
                let out_tx = out_tx.clone();
                in_flight.spawn(async move {
                    for line in router.route(&msg).await {
                        if out_tx.send(line).await.is_err() {
                            break;
                        }
                    }
                });
                summary.peak_in_flight = summary.peak_in_flight.max(in_flight.len());
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        log_task_result(joined);
    }
    drop(out_tx);

    let (written, writer) = writer_task
        .await
        .map_err(|e| TransportError::Writer(e.to_string()))??;
    summary.written = written;
    Ok((summary, writer))
}

fn log_task_result(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        warn!(error = %err, "Message task failed");
    }
}

async fn write_lines<W>(
    mut writer: W,
    mut out_rx: mpsc::Receiver<OutboundLine>,
) -> Result<(u64, W), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(line) = out_rx.recv().await {
        let encoded = match encode_line(&line) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "Dropped outbound line");
                continue;
            }
        };
        writer
            .write_all(encoded.as_bytes())
            .await
            .map_err(TransportError::Write)?;
        writer.write_all(b"\n").await.map_err(TransportError::Write)?;
        writer.flush().await.map_err(TransportError::Write)?;
        written += 1;
    }
    Ok((written, writer))
}
