//! # Accepted Origins
//!
//! Allow-list of browsing-context origins trusted for cross-context delivery.
//!
//! Origins are compared after trimming whitespace and a trailing `/`, so
//! `https://frame.example/` and `https://frame.example` name the same origin.

use crate::error::BrokerError;
use std::collections::BTreeSet;

/// Allow-list of trusted origins owned by a broker instance.
#[derive(Debug, Clone, Default)]
pub struct AcceptedOrigins {
    origins: BTreeSet<String>,
}

impl AcceptedOrigins {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an origin. Returns `false` if it was already accepted.
    ///
    /// # Errors
    ///
    /// `BrokerError::InvalidOrigin` if the origin is empty after normalization.
    pub fn add(&mut self, origin: &str) -> Result<bool, BrokerError> {
        let normalized = normalize(origin);
        if normalized.is_empty() {
            return Err(BrokerError::InvalidOrigin(origin.to_string()));
        }
        Ok(self.origins.insert(normalized.to_string()))
    }

    /// Remove an origin. Returns `false` if it was not accepted.
    pub fn remove(&mut self, origin: &str) -> bool {
        self.origins.remove(normalize(origin))
    }

    #[must_use]
    pub fn contains(&self, origin: &str) -> bool {
        self.origins.contains(normalize(origin))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Copy of the current allow-list.
    #[must_use]
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.origins.clone()
    }
}

pub(crate) fn normalize(origin: &str) -> &str {
    let trimmed = origin.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed)
}
