//! Domain Layer - Pure value types
//!
//! - Messages, envelopes, connection events and delivery reports
//! - Accepted origin allow-list
//! - Broker configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod message;
pub mod origins;

pub use config::BrokerConfig;
pub use message::{
    generate_message_id, BrokerMessage, ChannelDescriptor, ClientId, ConnectionEvent,
    ConnectionKind, DeliveryOutcome, DeliveryReport, InboundEnvelope,
};
pub use origins::AcceptedOrigins;
