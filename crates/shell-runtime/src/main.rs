//! # Shell Runtime
//!
//! Host process for the shell message broker.
//!
//! Input: one `InboundEnvelope` JSON object per line on stdin.
//! Output: one `InboundResult` JSON object per line on stdout.
//! Logs go to stderr.

use anyhow::Result;
use shell_runtime::{RuntimeConfig, ShellRuntime};
use shell_telemetry::{init_telemetry, TelemetryConfig};
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = RuntimeConfig::from_env()?;
    let runtime = ShellRuntime::start(config).await?;

    let stats = runtime
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    info!(
        received = stats.transport.received,
        reports = stats.reports_written,
        "Input closed, shutting down"
    );
    Ok(())
}
