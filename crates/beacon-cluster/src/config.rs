//! Peer registry configuration.

use beacon_core::constants::{
    LEASE_TIMEOUT_MS_NEVER, PEER_DOWN_EVICTION_TIMEOUT_MS_DEFAULT, PEER_SEED_NODE_WEIGHT_DEFAULT,
};
use serde::{Deserialize, Serialize};

/// Configuration for the peer registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRegistryConfig {
    /// How long a peer marked DOWN may linger before eviction, in
    /// milliseconds. `u64::MAX` disables eviction.
    pub down_peer_eviction_timeout_ms: u64,

    /// Sampling weight assigned to seed nodes; plain peers weigh 1.
    pub seed_node_weight: u64,
}

impl Default for PeerRegistryConfig {
    fn default() -> Self {
        Self {
            down_peer_eviction_timeout_ms: PEER_DOWN_EVICTION_TIMEOUT_MS_DEFAULT,
            seed_node_weight: PEER_SEED_NODE_WEIGHT_DEFAULT,
        }
    }
}

impl PeerRegistryConfig {
    /// Eviction timeout in milliseconds.
    pub fn with_eviction_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.down_peer_eviction_timeout_ms = timeout_ms;
        self
    }

    /// Registry that never evicts DOWN peers.
    pub fn non_evicting() -> Self {
        Self::default().with_eviction_timeout_ms(LEASE_TIMEOUT_MS_NEVER)
    }

    /// Sampling weight for seed nodes.
    pub fn with_seed_node_weight(mut self, weight: u64) -> Self {
        self.seed_node_weight = weight;
        self
    }

    /// Whether lazy eviction is active.
    pub fn eviction_enabled(&self) -> bool {
        self.down_peer_eviction_timeout_ms != LEASE_TIMEOUT_MS_NEVER
    }
}
