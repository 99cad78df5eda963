//! # Broker Messages
//!
//! Value types that travel through the broker: channel descriptors, messages,
//! connection events, inbound envelopes and delivery reports.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identifier of a registered client (host page, embedded frame, ...).
pub type ClientId = String;

/// Generate a fresh message id for correlation.
#[must_use]
pub fn generate_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// A named channel a client listens on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Channel identifier.
    pub channel_id: String,
}

impl ChannelDescriptor {
    /// Create a descriptor for the given channel id.
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
        }
    }
}

impl From<&str> for ChannelDescriptor {
    fn from(channel_id: &str) -> Self {
        Self::new(channel_id)
    }
}

/// A message published on a channel.
///
/// An empty `target_client_ids` list broadcasts to every subscriber of the
/// channel, the sender included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerMessage {
    /// Channel the message is published on.
    pub channel_id: String,
    /// Originating client.
    pub client_id: ClientId,
    /// Correlation id for acknowledgment.
    #[serde(default = "generate_message_id")]
    pub message_id: String,
    /// Message name.
    pub message_name: String,
    /// Explicit recipients, in the order given by the sender.
    #[serde(default)]
    pub target_client_ids: Vec<ClientId>,
    /// Arbitrary payload.
    #[serde(default)]
    pub data: Value,
}

impl BrokerMessage {
    /// Create a broadcast message with a generated id and no payload.
    pub fn new(
        channel_id: impl Into<String>,
        client_id: impl Into<ClientId>,
        message_name: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            client_id: client_id.into(),
            message_id: generate_message_id(),
            message_name: message_name.into(),
            target_client_ids: Vec::new(),
            data: Value::Null,
        }
    }

    /// Set an explicit message id.
    #[must_use]
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = message_id.into();
        self
    }

    /// Restrict delivery to the given clients.
    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ClientId>,
    {
        self.target_client_ids = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Whether the message goes to every subscriber of its channel.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.target_client_ids.is_empty()
    }
}

/// A message handed over by the cross-context transport together with the
/// origin the transport extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEnvelope {
    /// Origin of the sending browsing context.
    pub origin: String,
    /// The carried message.
    pub message: BrokerMessage,
}

/// Client lifecycle change on a shared channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Connected,
    Disconnected,
}

/// Notification sent to a client's connection callback when another client
/// joins or leaves a channel they share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    pub kind: ConnectionKind,
    /// The client that joined or left.
    pub client_id: ClientId,
    pub channel_id: String,
    /// Data the client supplied when subscribing.
    pub data: Value,
}

/// Outcome of delivering one message to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The handler settled successfully with this acknowledgment.
    Delivered(Value),
    /// The handler failed, panicked or timed out.
    Failed(String),
    /// The target is not subscribed to the channel.
    NotDelivered,
}

impl DeliveryOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-client results of a single publish call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    outcomes: BTreeMap<ClientId, DeliveryOutcome>,
}

impl DeliveryReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, client_id: ClientId, outcome: DeliveryOutcome) {
        self.outcomes.insert(client_id, outcome);
    }

    /// Outcome for a given client, if it was addressed.
    #[must_use]
    pub fn get(&self, client_id: &str) -> Option<&DeliveryOutcome> {
        self.outcomes.get(client_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ClientId, DeliveryOutcome> {
        self.outcomes.iter()
    }

    /// Number of successful deliveries.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_delivered()).count()
    }

    /// Number of failed deliveries.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failed()).count()
    }
}

impl<'a> IntoIterator for &'a DeliveryReport {
    type Item = (&'a ClientId, &'a DeliveryOutcome);
    type IntoIter = btree_map::Iter<'a, ClientId, DeliveryOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
