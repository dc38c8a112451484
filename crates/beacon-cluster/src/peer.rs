//! Peer record and status.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique peer identifier.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(Uuid);

impl PeerId {
    /// Wrap an existing identifier.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gossip-level status of a peer.
///
/// Transitions are driven by the gossip protocol and stored verbatim; the
/// registry itself only distinguishes UP (eligible for sampling) and DOWN
/// (eligible for eviction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerStatus {
    /// Unreachable; will be evicted once it has been down long enough.
    Down,
    /// Healthy and eligible as a replication target.
    Up,
    /// In the process of joining the cluster.
    Joining,
    /// Reachable but degraded.
    Sick,
}

impl fmt::Display for PeerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => write!(f, "down"),
            Self::Up => write!(f, "up"),
            Self::Joining => write!(f, "joining"),
            Self::Sick => write!(f, "sick"),
        }
    }
}

/// One cluster member node.
///
/// Upserted wholesale (last writer wins); there are no partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Unique peer identifier.
    pub id: PeerId,
    /// Hostname the peer is reachable at.
    pub host: String,
    /// Port of the gossip endpoint.
    pub gossip_port: u16,
    /// Port of the HTTP API endpoint.
    pub http_port: u16,
    /// Current gossip status.
    pub status: PeerStatus,
    /// Seed nodes get a higher sampling weight.
    pub is_seed_node: bool,
    /// When this record was last refreshed (Unix ms).
    pub last_updated_ms: u64,
    /// When the peer process started its current generation (Unix ms).
    pub generation_timestamp_ms: u64,
    /// Heartbeats observed for this peer.
    pub heartbeats: u64,
}

impl Peer {
    /// Build a peer record in JOINING state with zero heartbeats.
    pub fn new(
        id: PeerId,
        host: impl Into<String>,
        gossip_port: u16,
        http_port: u16,
        is_seed_node: bool,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            host: host.into(),
            gossip_port,
            http_port,
            status: PeerStatus::Joining,
            is_seed_node,
            last_updated_ms: now_ms,
            generation_timestamp_ms: now_ms,
            heartbeats: 0,
        }
    }

    /// Derive a copy with the given status.
    pub fn with_status(mut self, status: PeerStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether this peer is eligible as a replication target.
    pub fn is_up(&self) -> bool {
        self.status == PeerStatus::Up
    }

    /// Whether this peer is DOWN and has been stale for at least
    /// `timeout_nanos` as of the monotonic reading `now_nanos`.
    pub fn down_longer_than(&self, now_nanos: u64, timeout_nanos: u64) -> bool {
        self.status == PeerStatus::Down
            && now_nanos.saturating_sub(self.last_updated_ms.saturating_mul(1_000_000))
                >= timeout_nanos
    }
}
