//! Configuration for a Beacon node.
//!
//! TigerStyle: explicit defaults, validation before use.

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration consumed by the server binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// HTTP boundary configuration.
    #[serde(default)]
    pub http: HttpConfig,

    /// Client registry configuration.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Peer registry configuration.
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl BeaconConfig {
    /// Validate the configuration as a whole.
    pub fn validate(&self) -> Result<()> {
        self.http.validate()?;
        self.registry.validate()?;
        self.cluster.validate()?;
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to bind the API listener to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    HTTP_BIND_ADDRESS_DEFAULT.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if !self.bind_address.contains(':') {
            return Err(Error::invalid_configuration(
                "http.bind_address",
                "must be in host:port format",
            ));
        }
        Ok(())
    }
}

/// Client registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Lease timeout in milliseconds. `u64::MAX` disables expiry.
    #[serde(default = "default_lease_timeout_ms")]
    pub lease_timeout_ms: u64,
}

fn default_lease_timeout_ms() -> u64 {
    CLIENT_LEASE_TIMEOUT_MS_DEFAULT
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            lease_timeout_ms: default_lease_timeout_ms(),
        }
    }
}

impl RegistryConfig {
    fn validate(&self) -> Result<()> {
        if self.lease_timeout_ms == 0 {
            return Err(Error::invalid_configuration(
                "registry.lease_timeout_ms",
                "must be positive (use u64::MAX to disable expiry)",
            ));
        }
        Ok(())
    }
}

/// Peer registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// How long a DOWN peer may linger before eviction, in milliseconds.
    /// `u64::MAX` disables eviction.
    #[serde(default = "default_down_peer_eviction_timeout_ms")]
    pub down_peer_eviction_timeout_ms: u64,

    /// Sampling weight assigned to seed nodes.
    #[serde(default = "default_seed_node_weight")]
    pub seed_node_weight: u64,
}

fn default_down_peer_eviction_timeout_ms() -> u64 {
    PEER_DOWN_EVICTION_TIMEOUT_MS_DEFAULT
}

fn default_seed_node_weight() -> u64 {
    PEER_SEED_NODE_WEIGHT_DEFAULT
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            down_peer_eviction_timeout_ms: default_down_peer_eviction_timeout_ms(),
            seed_node_weight: default_seed_node_weight(),
        }
    }
}

impl ClusterConfig {
    fn validate(&self) -> Result<()> {
        if self.seed_node_weight == 0 {
            return Err(Error::invalid_configuration(
                "cluster.seed_node_weight",
                "must be at least 1",
            ));
        }
        if self.down_peer_eviction_timeout_ms == 0 {
            return Err(Error::invalid_configuration(
                "cluster.down_peer_eviction_timeout_ms",
                "must be positive (use u64::MAX to disable eviction)",
            ));
        }
        Ok(())
    }
}
