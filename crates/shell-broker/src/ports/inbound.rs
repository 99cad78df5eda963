//! Inbound Ports (Driving Ports)
//!
//! The complete public surface of the broker.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::{BrokerMessage, ChannelDescriptor, DeliveryReport};
use crate::error::BrokerError;
use crate::ports::outbound::ClientHandler;

/// Primary message broker API (Driving Port)
#[async_trait]
pub trait BrokerApi: Send + Sync {
    /// Register a client, or atomically replace its existing registration.
    ///
    /// # Errors
    ///
    /// `BrokerError::InvalidClientId` if `client_id` is empty or blank.
    async fn subscribe(
        &self,
        client_id: &str,
        channels: Vec<ChannelDescriptor>,
        data: Value,
        handler: Arc<dyn ClientHandler>,
    ) -> Result<(), BrokerError>;

    /// Remove a client registration. Unknown clients are ignored.
    async fn unsubscribe(&self, client_id: &str) -> Result<(), BrokerError>;

    /// Deliver a message to the subscribed targets on its channel.
    ///
    /// Resolves once every invoked handler has settled. Handler failures are
    /// reported per client and never fail the call.
    ///
    /// # Errors
    ///
    /// `BrokerError::InvalidChannelId` if the message has no channel.
    async fn publish(&self, message: BrokerMessage) -> Result<DeliveryReport, BrokerError>;

    /// Trust an origin for inbound cross-context messages.
    ///
    /// # Errors
    ///
    /// `BrokerError::InvalidOrigin` if the origin is blank.
    async fn add_accepted_origin(&self, origin: &str) -> Result<(), BrokerError>;

    /// Stop trusting an origin. Unknown origins are ignored.
    async fn remove_accepted_origin(&self, origin: &str) -> Result<(), BrokerError>;

    /// Current allow-list.
    async fn accepted_origins(&self) -> BTreeSet<String>;
}
