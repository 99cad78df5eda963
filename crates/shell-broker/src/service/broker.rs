//! # Message Broker
//!
//! Routes named messages between registered clients.
//!
//! ## Delivery
//!
//! `publish` snapshots the recipients under a read lock, releases it, then
//! drives every handler concurrently and joins them all-settled. A failing,
//! panicking or (with `ack_timeout`) slow handler only affects its own entry
//! in the report.
//!
//! ## Origin Gate
//!
//! Envelopes from the transport are checked against the accepted origins
//! before anything else happens. Rejected envelopes are dropped and logged;
//! the sender is never told why.

use crate::domain::{
    AcceptedOrigins, BrokerConfig, BrokerMessage, ChannelDescriptor, DeliveryOutcome,
    DeliveryReport, InboundEnvelope,
};
use crate::error::BrokerError;
use crate::metrics::BrokerMetrics;
use crate::ports::{BrokerApi, ClientHandler};
use crate::service::registry::{ClientEntry, ClientRegistry, ConnectionNotice};
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::collections::{BTreeSet, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Failure reason reported when a handler misses the acknowledgment timeout.
pub const ACK_TIMEOUT_REASON: &str = "acknowledgment timed out";

/// In-memory message broker.
///
/// All state is owned by the instance; independent brokers never interact.
pub struct MessageBroker {
    clients: RwLock<ClientRegistry>,
    origins: RwLock<AcceptedOrigins>,
    ack_timeout: Option<Duration>,
    transport_capacity: usize,
    metrics: Arc<BrokerMetrics>,
}

impl MessageBroker {
    /// Create a broker with default configuration (no accepted origins, no
    /// acknowledgment timeout).
    #[must_use]
    pub fn new() -> Self {
        Self::build(&BrokerConfig::default())
    }

    /// Create a broker from a validated configuration.
    ///
    /// # Errors
    ///
    /// Any error from [`BrokerConfig::validate`].
    pub fn with_config(config: BrokerConfig) -> Result<Self, BrokerError> {
        config.validate()?;
        Ok(Self::build(&config))
    }

    fn build(config: &BrokerConfig) -> Self {
        let mut origins = AcceptedOrigins::new();
        for origin in &config.accepted_origins {
            if let Err(e) = origins.add(origin) {
                warn!(error = %e, "Skipping invalid accepted origin");
            }
        }

        Self {
            clients: RwLock::new(ClientRegistry::new()),
            origins: RwLock::new(origins),
            ack_timeout: config.ack_timeout,
            transport_capacity: config.transport_capacity,
            metrics: Arc::new(BrokerMetrics::new()),
        }
    }

    /// Number of registered clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Whether a client is registered.
    #[must_use]
    pub fn is_subscribed(&self, client_id: &str) -> bool {
        self.clients.read().get(client_id).is_some()
    }

    /// Inbound envelopes a [`TransportAdapter`](crate::TransportAdapter)
    /// attached to this broker buffers.
    #[must_use]
    pub fn transport_capacity(&self) -> usize {
        self.transport_capacity
    }

    /// Metrics collector for this broker.
    pub fn metrics(&self) -> Arc<BrokerMetrics> {
        self.metrics.clone()
    }

    /// Accept a message from another browsing context.
    ///
    /// Returns `None` when the envelope was dropped, either at the origin gate
    /// or because the carried message was malformed.
    pub async fn handle_inbound(&self, envelope: InboundEnvelope) -> Option<DeliveryReport> {
        let accepted = self.origins.read().contains(&envelope.origin);
        if !accepted {
            self.metrics.record_origin_rejected();
            warn!(
                origin = %envelope.origin,
                channel = %envelope.message.channel_id,
                "Dropped message from non-accepted origin"
            );
            return None;
        }

        match self.publish(envelope.message).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(origin = %envelope.origin, error = %e, "Dropped malformed inbound message");
                None
            }
        }
    }

    /// Run connection callbacks all-settled. With `ack_timeout` set, a
    /// callback that does not finish in time is abandoned so the subscribe or
    /// unsubscribe call still returns.
    async fn dispatch_notices(&self, notices: Vec<ConnectionNotice>) {
        let ack_timeout = self.ack_timeout;
        let calls = notices.into_iter().map(|(handler, event)| async move {
            let client = event.client_id.clone();
            let call =
                AssertUnwindSafe(async move { handler.on_connection_change(event).await })
                    .catch_unwind();

            let settled = match ack_timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(settled) => settled,
                    Err(_) => {
                        warn!(client = %client, "Connection callback timed out");
                        return;
                    }
                },
                None => call.await,
            };

            if let Err(panic) = settled {
                warn!(reason = %panic_reason(panic.as_ref()), "Connection callback panicked");
            }
        });

        join_all(calls).await;
    }
}

impl Default for MessageBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrokerApi for MessageBroker {
    async fn subscribe(
        &self,
        client_id: &str,
        channels: Vec<ChannelDescriptor>,
        data: Value,
        handler: Arc<dyn ClientHandler>,
    ) -> Result<(), BrokerError> {
        if client_id.trim().is_empty() {
            return Err(BrokerError::InvalidClientId(client_id.to_string()));
        }

        let channels: BTreeSet<ChannelDescriptor> = channels.into_iter().collect();
        let notices = {
            let mut clients = self.clients.write();
            let entry = ClientEntry {
                channels: channels.clone(),
                data: data.clone(),
                handler: handler.clone(),
            };
            let previous = clients.insert(client_id.to_string(), entry);
            let old_channels = previous.map(|p| p.channels).unwrap_or_default();
            clients.connection_notices(client_id, Some(&handler), &data, &old_channels, &channels)
        };

        self.metrics.record_subscribe();
        debug!(client = client_id, channels = channels.len(), "Client subscribed");

        self.dispatch_notices(notices).await;
        Ok(())
    }

    async fn unsubscribe(&self, client_id: &str) -> Result<(), BrokerError> {
        let notices = {
            let mut clients = self.clients.write();
            let Some(previous) = clients.remove(client_id) else {
                debug!(client = client_id, "Unsubscribe for unknown client ignored");
                return Ok(());
            };
            clients.connection_notices(
                client_id,
                None,
                &previous.data,
                &previous.channels,
                &BTreeSet::new(),
            )
        };

        self.metrics.record_unsubscribe();
        debug!(client = client_id, "Client unsubscribed");

        self.dispatch_notices(notices).await;
        Ok(())
    }

    async fn publish(&self, message: BrokerMessage) -> Result<DeliveryReport, BrokerError> {
        if message.channel_id.trim().is_empty() {
            return Err(BrokerError::InvalidChannelId(message.channel_id));
        }

        let mut report = DeliveryReport::new();
        let recipients = {
            let clients = self.clients.read();
            if message.is_broadcast() {
                clients.subscribers_of(&message.channel_id)
            } else {
                let mut seen = HashSet::new();
                let mut recipients = Vec::new();
                for target in &message.target_client_ids {
                    if !seen.insert(target.as_str()) {
                        continue;
                    }
                    match clients.get(target) {
                        Some(entry) if entry.listens_on(&message.channel_id) => {
                            recipients.push((target.clone(), entry.handler.clone()));
                        }
                        _ => report.insert(target.clone(), DeliveryOutcome::NotDelivered),
                    }
                }
                recipients
            }
        };

        self.metrics.record_publish();
        debug!(
            channel = %message.channel_id,
            sender = %message.client_id,
            message_id = %message.message_id,
            name = %message.message_name,
            recipients = recipients.len(),
            "Publishing message"
        );

        let ack_timeout = self.ack_timeout;
        let deliveries = recipients.into_iter().map(|(client_id, handler)| {
            let message = message.clone();
            async move {
                let outcome = deliver(handler, message, ack_timeout).await;
                (client_id, outcome)
            }
        });

        for (client_id, outcome) in join_all(deliveries).await {
            if let DeliveryOutcome::Failed(reason) = &outcome {
                warn!(
                    client = %client_id,
                    message_id = %message.message_id,
                    reason = %reason,
                    "Delivery failed"
                );
            }
            report.insert(client_id, outcome);
        }

        for (_, outcome) in &report {
            self.metrics.record_outcome(outcome);
        }

        Ok(report)
    }

    async fn add_accepted_origin(&self, origin: &str) -> Result<(), BrokerError> {
        if self.origins.write().add(origin)? {
            debug!(origin, "Accepted origin added");
        }
        Ok(())
    }

    async fn remove_accepted_origin(&self, origin: &str) -> Result<(), BrokerError> {
        if self.origins.write().remove(origin) {
            debug!(origin, "Accepted origin removed");
        }
        Ok(())
    }

    async fn accepted_origins(&self) -> BTreeSet<String> {
        self.origins.read().snapshot()
    }
}

/// Invoke one handler and settle its result into an outcome.
async fn deliver(
    handler: Arc<dyn ClientHandler>,
    message: BrokerMessage,
    ack_timeout: Option<Duration>,
) -> DeliveryOutcome {
    let call = AssertUnwindSafe(async move { handler.on_message(message).await }).catch_unwind();

    let settled = match ack_timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(settled) => settled,
            Err(_) => return DeliveryOutcome::Failed(ACK_TIMEOUT_REASON.to_string()),
        },
        None => call.await,
    };

    match settled {
        Ok(Ok(ack)) => DeliveryOutcome::Delivered(ack),
        Ok(Err(e)) => DeliveryOutcome::Failed(e.to_string()),
        Err(panic) => DeliveryOutcome::Failed(panic_reason(panic.as_ref())),
    }
}

fn panic_reason(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}
