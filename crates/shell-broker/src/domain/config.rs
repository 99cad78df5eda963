//! Broker configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use shell_broker::BrokerConfig;
//! use std::time::Duration;
//!
//! let config = BrokerConfig::default()
//!     .with_accepted_origin("https://frame.example")
//!     .with_ack_timeout(Duration::from_secs(5));
//! config.validate()?;
//! ```

use crate::domain::origins;
use crate::error::BrokerError;
use crate::DEFAULT_TRANSPORT_CAPACITY;
use std::time::Duration;

/// Message broker configuration.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Origins accepted for inbound cross-context messages.
    pub accepted_origins: Vec<String>,
    /// Per-recipient acknowledgment timeout. `None` waits indefinitely.
    pub ack_timeout: Option<Duration>,
    /// Inbound envelopes buffered by the transport adapter.
    pub transport_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            accepted_origins: Vec::new(),
            ack_timeout: None,
            transport_capacity: DEFAULT_TRANSPORT_CAPACITY,
        }
    }
}

impl BrokerConfig {
    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// - `BrokerError::InvalidOrigin` for an origin that is blank after
    ///   normalization (e.g. `"/"`)
    /// - `BrokerError::InvalidConfig` for a zero timeout or zero capacity
    pub fn validate(&self) -> Result<(), BrokerError> {
        if let Some(origin) = self
            .accepted_origins
            .iter()
            .find(|o| origins::normalize(o).is_empty())
        {
            return Err(BrokerError::InvalidOrigin(origin.clone()));
        }

        if self.ack_timeout == Some(Duration::ZERO) {
            return Err(BrokerError::InvalidConfig(
                "ack_timeout cannot be zero".to_string(),
            ));
        }

        if self.transport_capacity == 0 {
            return Err(BrokerError::InvalidConfig(
                "transport_capacity cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to accept an origin
    #[must_use]
    pub fn with_accepted_origin(mut self, origin: impl Into<String>) -> Self {
        self.accepted_origins.push(origin.into());
        self
    }

    /// Builder-style method to set the acknowledgment timeout
    #[must_use]
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = Some(timeout);
        self
    }

    /// Builder-style method to set the transport capacity
    #[must_use]
    pub fn with_transport_capacity(mut self, capacity: usize) -> Self {
        self.transport_capacity = capacity;
        self
    }
}
