//! Adapters Layer - External connections
//!
//! - `TransportAdapter`: Feeds cross-context envelopes into the broker

pub mod transport;

pub use transport::{InboundResult, TransportAdapter, TransportStats};
