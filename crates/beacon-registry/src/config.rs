//! Client registry configuration.

use beacon_core::constants::{CLIENT_LEASE_TIMEOUT_MS_DEFAULT, LEASE_TIMEOUT_MS_NEVER};
use serde::{Deserialize, Serialize};

/// Configuration for the client registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRegistryConfig {
    /// Lease timeout in milliseconds. An entry whose last renewal is at
    /// least this old is dropped by the next sweep touching its
    /// application. `u64::MAX` disables expiry entirely.
    pub lease_timeout_ms: u64,
}

impl Default for ClientRegistryConfig {
    fn default() -> Self {
        Self {
            lease_timeout_ms: CLIENT_LEASE_TIMEOUT_MS_DEFAULT,
        }
    }
}

impl ClientRegistryConfig {
    /// Expiring registry with the given lease timeout.
    pub fn with_lease_timeout_ms(lease_timeout_ms: u64) -> Self {
        Self { lease_timeout_ms }
    }

    /// Registry that never expires entries.
    pub fn non_expiring() -> Self {
        Self {
            lease_timeout_ms: LEASE_TIMEOUT_MS_NEVER,
        }
    }

    /// Whether lazy expiry is active.
    pub fn expiry_enabled(&self) -> bool {
        self.lease_timeout_ms != LEASE_TIMEOUT_MS_NEVER
    }
}
