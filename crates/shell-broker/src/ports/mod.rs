//! Ports Layer - Trait definitions
//!
//! - `BrokerApi`: Driving port (inbound API used by clients and the transport)
//! - `ClientHandler`: Driven port (callbacks a client registers)

pub mod inbound;
pub mod outbound;

pub use inbound::BrokerApi;
pub use outbound::ClientHandler;
