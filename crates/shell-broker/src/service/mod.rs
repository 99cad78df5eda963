//! Service Layer - Orchestration
//!
//! - `MessageBroker`: Implements `BrokerApi`

pub mod broker;
mod registry;

pub use broker::{MessageBroker, ACK_TIMEOUT_REASON};
