//! # Shell Broker - Cross-Context Message Broker
//!
//! Publish/subscribe messaging between isolated execution contexts such as a
//! host page and its embedded frames.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): messages, envelopes, reports, origins, config
//! - **Ports Layer** (`ports/`): `BrokerApi` (driving), `ClientHandler` (driven)
//! - **Service Layer** (`service/`): `MessageBroker`
//! - **Adapters Layer** (`adapters/`): `TransportAdapter`
//!
//! ```text
//! ┌──────────────┐  InboundEnvelope   ┌──────────────┐
//! │  Transport   │ ─────────────────→ │   Adapter    │
//! └──────────────┘                    └──────┬───────┘
//!                                            │ origin gate
//!                                            ▼
//!                                     ┌──────────────┐  on_message()
//!                                     │MessageBroker │ ─────────────→ clients
//!                                     └──────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - A message reaches only clients currently subscribed to its channel
//! - Targets that are not subscribed are reported `NotDelivered`, never an error
//! - One failing recipient never affects the others
//! - Envelopes from origins outside the allow-list are dropped before any
//!   client callback runs
//!
//! ## Usage Example
//!
//! ```ignore
//! use shell_broker::{BrokerApi, BrokerMessage, ChannelDescriptor, MessageBroker};
//!
//! let broker = MessageBroker::new();
//! broker.subscribe("host", vec![ChannelDescriptor::new("shell")], json!({}), handler).await?;
//! let report = broker.publish(BrokerMessage::new("shell", "host", "ping")).await?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{InboundResult, TransportAdapter, TransportStats};
pub use domain::{
    generate_message_id, AcceptedOrigins, BrokerConfig, BrokerMessage, ChannelDescriptor,
    ClientId, ConnectionEvent, ConnectionKind, DeliveryOutcome, DeliveryReport, InboundEnvelope,
};
pub use error::{BrokerError, HandlerError};
pub use metrics::{BrokerMetrics, BrokerMetricsSnapshot};
pub use ports::{BrokerApi, ClientHandler};
pub use service::{MessageBroker, ACK_TIMEOUT_REASON};

/// Default number of inbound envelopes buffered by the transport adapter.
pub const DEFAULT_TRANSPORT_CAPACITY: usize = 1000;
