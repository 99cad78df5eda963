//! Error types for the message broker

use thiserror::Error;

/// Errors returned by broker operations.
///
/// Delivery failures of individual recipients are never reported here; they
/// are collected per client in a [`crate::DeliveryReport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("Invalid client id: {0:?}")]
    InvalidClientId(String),

    #[error("Invalid channel id: {0:?}")]
    InvalidChannelId(String),

    #[error("Invalid origin: {0:?}")]
    InvalidOrigin(String),

    #[error("Invalid broker configuration: {0}")]
    InvalidConfig(String),
}

/// Failure reported by a client's message handler.
///
/// The reason string ends up in the sender's delivery report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct HandlerError {
    reason: String,
}

impl HandlerError {
    /// Create a handler error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason reported to the sender.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
