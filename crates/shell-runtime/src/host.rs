//! # Host Client
//!
//! The client the runtime itself subscribes as. It acknowledges every
//! message it receives and logs connection changes on its channels.

use async_trait::async_trait;
use serde_json::{json, Value};
use shell_broker::{BrokerMessage, ClientHandler, ConnectionEvent, HandlerError};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct HostClient {
    received: AtomicU64,
}

impl HostClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages acknowledged so far.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ClientHandler for HostClient {
    async fn on_message(&self, message: BrokerMessage) -> Result<Value, HandlerError> {
        let count = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        shell_telemetry::log_event!(
            info,
            "host",
            "Message received",
            channel = %message.channel_id,
            from = %message.client_id,
            name = %message.message_name,
            count = count
        );
        Ok(json!({ "acknowledged": message.message_id }))
    }

    async fn on_connection_change(&self, event: ConnectionEvent) {
        info!(
            kind = ?event.kind,
            client = %event.client_id,
            channel = %event.channel_id,
            "Peer connection changed"
        );
    }
}
