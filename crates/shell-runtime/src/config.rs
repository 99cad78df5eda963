//! # Runtime Configuration
//!
//! Environment-driven settings for the host binary.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SHELL_ACCEPTED_ORIGINS` | empty | Comma separated origin allow-list |
//! | `SHELL_ACK_TIMEOUT_MS` | unset | Per-recipient acknowledgment timeout |
//! | `SHELL_HOST_CLIENT_ID` | `shell-host` | Client id the host subscribes as |
//! | `SHELL_HOST_CHANNELS` | `shell` | Comma separated channels the host joins |
//! | `SHELL_TRANSPORT_CAPACITY` | `1000` | Inbound envelope buffer |

use shell_broker::{BrokerConfig, DEFAULT_TRANSPORT_CAPACITY};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must name at least one entry")]
    EmptyList { var: &'static str },
}

/// Host runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub accepted_origins: Vec<String>,
    pub ack_timeout: Option<Duration>,
    pub host_client_id: String,
    pub host_channels: Vec<String>,
    pub transport_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            accepted_origins: Vec::new(),
            ack_timeout: None,
            host_client_id: "shell-host".to_string(),
            host_channels: vec!["shell".to_string()],
            transport_capacity: DEFAULT_TRANSPORT_CAPACITY,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(origins) = lookup("SHELL_ACCEPTED_ORIGINS") {
            config.accepted_origins = split_list(&origins);
        }

        if let Some(raw) = lookup("SHELL_ACK_TIMEOUT_MS") {
            let millis = parse_positive("SHELL_ACK_TIMEOUT_MS", &raw)?;
            config.ack_timeout = Some(Duration::from_millis(millis));
        }

        if let Some(id) = lookup("SHELL_HOST_CLIENT_ID") {
            let id = id.trim();
            if !id.is_empty() {
                config.host_client_id = id.to_string();
            }
        }

        if let Some(channels) = lookup("SHELL_HOST_CHANNELS") {
            config.host_channels = split_list(&channels);
            if config.host_channels.is_empty() {
                return Err(ConfigError::EmptyList {
                    var: "SHELL_HOST_CHANNELS",
                });
            }
        }

        if let Some(raw) = lookup("SHELL_TRANSPORT_CAPACITY") {
            let capacity = parse_positive("SHELL_TRANSPORT_CAPACITY", &raw)?;
            config.transport_capacity =
                usize::try_from(capacity).map_err(|_| ConfigError::InvalidNumber {
                    var: "SHELL_TRANSPORT_CAPACITY",
                    value: raw.clone(),
                })?;
        }

        Ok(config)
    }

    /// Broker settings derived from this configuration.
    pub fn broker_config(&self) -> BrokerConfig {
        let mut config = self
            .accepted_origins
            .iter()
            .fold(BrokerConfig::default(), |config, origin| {
                config.with_accepted_origin(origin.clone())
            })
            .with_transport_capacity(self.transport_capacity);
        config.ack_timeout = self.ack_timeout;
        config
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        }),
    }
}
