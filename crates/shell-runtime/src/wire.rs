//! # Line Transport
//!
//! Line-delimited JSON framing for inbound envelopes and delivery results.

use shell_broker::{InboundEnvelope, InboundResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Counters for one pump run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub forwarded: u64,
    pub malformed: u64,
}

/// Read envelopes from `reader` until EOF and forward them to the adapter.
///
/// Blank lines are skipped. Lines that fail to parse are logged and counted.
pub async fn pump_lines<R>(
    reader: R,
    sender: mpsc::Sender<InboundEnvelope>,
) -> std::io::Result<PumpStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = PumpStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<InboundEnvelope>(line) {
            Ok(envelope) => {
                if sender.send(envelope).await.is_err() {
                    debug!("Adapter closed, stopping input");
                    break;
                }
                stats.forwarded += 1;
            }
            Err(e) => {
                warn!(error = %e, "Malformed envelope, skipping line");
                stats.malformed += 1;
            }
        }
    }

    Ok(stats)
}

/// Write each result as one JSON line until the result channel closes.
pub async fn write_results<W>(
    mut writer: W,
    mut results: mpsc::Receiver<InboundResult>,
) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(result) = results.recv().await {
        let mut line = serde_json::to_vec(&result)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        written += 1;
    }
    Ok(written)
}
