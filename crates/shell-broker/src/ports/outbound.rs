//! Outbound Ports (Driven Ports)
//!
//! Callbacks the broker invokes on registered clients.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{BrokerMessage, ConnectionEvent};
use crate::error::HandlerError;

/// Callbacks supplied by a client on `subscribe`.
#[async_trait]
pub trait ClientHandler: Send + Sync {
    /// Handle an inbound message.
    ///
    /// The returned value is the client's acknowledgment and is reported back
    /// to the publisher. An error or a panic is reported as a failed delivery.
    async fn on_message(&self, message: BrokerMessage) -> Result<Value, HandlerError>;

    /// Another client joined or left a channel this client listens on.
    async fn on_connection_change(&self, _event: ConnectionEvent) {}
}
