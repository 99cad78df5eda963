//! # Shell Runtime
//!
//! Wires a [`MessageBroker`] to a line-delimited JSON transport.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Build the broker with the configured origin allow-list
//! 3. Subscribe the host client on its channels
//! 4. Start the transport adapter and the result writer
//! 5. Pump stdin until EOF, then drain in-flight deliveries

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod host;
pub mod wire;

pub use config::{ConfigError, RuntimeConfig};
pub use host::HostClient;
pub use wire::{pump_lines, write_results, PumpStats};

use anyhow::{Context, Result};
use serde_json::json;
use shell_broker::{
    BrokerApi, ChannelDescriptor, MessageBroker, TransportAdapter, TransportStats,
};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::info;

/// Summary of a finished runtime session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub input: PumpStats,
    pub transport: TransportStats,
    pub reports_written: u64,
}

/// The host runtime: broker plus host client.
pub struct ShellRuntime {
    config: RuntimeConfig,
    broker: Arc<MessageBroker>,
    host: Arc<HostClient>,
}

impl ShellRuntime {
    /// Build the broker and subscribe the host client.
    pub async fn start(config: RuntimeConfig) -> Result<Self> {
        let broker = MessageBroker::with_config(config.broker_config())
            .context("Invalid broker configuration")?;
        let broker = Arc::new(broker);
        let host = Arc::new(HostClient::new());

        let channels = config
            .host_channels
            .iter()
            .map(|c| ChannelDescriptor::new(c.as_str()))
            .collect();
        broker
            .subscribe(
                &config.host_client_id,
                channels,
                json!({ "role": "host" }),
                host.clone(),
            )
            .await
            .context("Failed to subscribe host client")?;

        info!(
            host = %config.host_client_id,
            channels = ?config.host_channels,
            origins = config.accepted_origins.len(),
            "Shell runtime started"
        );

        Ok(Self {
            config,
            broker,
            host,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn broker(&self) -> Arc<MessageBroker> {
        self.broker.clone()
    }

    pub fn host(&self) -> Arc<HostClient> {
        self.host.clone()
    }

    /// Serve envelopes from `reader` and write results to `writer` until
    /// the input ends and every in-flight delivery has settled.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<SessionStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (results_tx, results_rx) = mpsc::channel(self.broker.transport_capacity());
        let (sender, adapter) = TransportAdapter::attach(self.broker.clone());
        let adapter = tokio::spawn(adapter.with_result_sink(results_tx).run());
        let output = tokio::spawn(write_results(writer, results_rx));

        // The pump owns the only sender, so the adapter and writer wind down
        // once it returns, whether or not the input failed.
        let input = pump_lines(reader, sender).await;
        let transport = adapter.await;
        let written = output.await;

        let input = input.context("Failed to read inbound envelopes")?;
        let transport = transport.context("Transport adapter panicked")?;
        let reports_written = written.context("Result writer panicked")??;

        let metrics = self.broker.metrics().snapshot();
        info!(
            forwarded = input.forwarded,
            malformed = input.malformed,
            dropped = transport.dropped,
            delivered = metrics.deliveries_succeeded,
            failed = metrics.deliveries_failed,
            "Session finished"
        );

        Ok(SessionStats {
            input,
            transport,
            reports_written,
        })
    }
}
