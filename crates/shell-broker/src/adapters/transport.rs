//! Transport Adapter
//!
//! Bridges a cross-context transport (postMessage bridge, socket, stdin, ...)
//! into the broker. The transport pushes `InboundEnvelope`s into an mpsc
//! channel; the adapter gates and publishes each one on its own task so a
//! hung recipient only stalls that envelope.

use crate::domain::{DeliveryReport, InboundEnvelope};
use crate::service::MessageBroker;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Result of handling one inbound envelope.
#[derive(Debug, Clone, Serialize)]
pub struct InboundResult {
    /// Message id of the carried message.
    pub message_id: String,
    /// `None` if the envelope was dropped.
    pub report: Option<DeliveryReport>,
}

/// Counters for a finished adapter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    pub received: u64,
    pub dropped: u64,
}

/// Feeds inbound envelopes into a broker.
pub struct TransportAdapter {
    broker: Arc<MessageBroker>,
    receiver: mpsc::Receiver<InboundEnvelope>,
    results: Option<mpsc::Sender<InboundResult>>,
}

impl TransportAdapter {
    /// Create an adapter and the sender the transport writes to.
    pub fn new(
        broker: Arc<MessageBroker>,
        capacity: usize,
    ) -> (mpsc::Sender<InboundEnvelope>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let adapter = Self {
            broker,
            receiver,
            results: None,
        };
        (sender, adapter)
    }

    /// Create an adapter buffering as many envelopes as the broker's
    /// configured transport capacity.
    pub fn attach(broker: Arc<MessageBroker>) -> (mpsc::Sender<InboundEnvelope>, Self) {
        let capacity = broker.transport_capacity();
        Self::new(broker, capacity)
    }

    /// Forward each handled envelope's result to `sink`.
    #[must_use]
    pub fn with_result_sink(mut self, sink: mpsc::Sender<InboundResult>) -> Self {
        self.results = Some(sink);
        self
    }

    /// Run until every transport sender is dropped and all in-flight
    /// envelopes have settled.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) -> TransportStats {
        info!("[TransportAdapter] Started listening for inbound envelopes");

        let mut stats = TransportStats::default();
        let mut in_flight = JoinSet::new();

        while let Some(envelope) = self.receiver.recv().await {
            stats.received += 1;
            let broker = self.broker.clone();
            let results = self.results.clone();

            in_flight.spawn(async move {
                let message_id = envelope.message.message_id.clone();
                let report = broker.handle_inbound(envelope).await;
                let dropped = report.is_none();

                if let Some(results) = results {
                    if results.send(InboundResult { message_id, report }).await.is_err() {
                        debug!("Result sink closed");
                    }
                }
                dropped
            });

            // Reap finished tasks so the set does not grow without bound.
            while let Some(done) = in_flight.try_join_next() {
                stats.dropped += settle(done);
            }
        }

        while let Some(done) = in_flight.join_next().await {
            stats.dropped += settle(done);
        }

        info!(
            received = stats.received,
            dropped = stats.dropped,
            "[TransportAdapter] Transport closed, shutting down"
        );
        stats
    }
}

fn settle(done: Result<bool, tokio::task::JoinError>) -> u64 {
    match done {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(e) => {
            warn!(error = %e, "Inbound task failed");
            1
        }
    }
}
