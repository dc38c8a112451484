//! Beacon Cluster
//!
//! Registry of cluster member nodes. The surrounding gossip protocol
//! registers peers it discovers and samples a weighted-random subset of UP
//! peers as replication targets; seed nodes are favoured during sampling.
//! Peers marked DOWN are evicted lazily after a configurable timeout.

pub mod config;
pub mod peer;
pub mod registry;

pub use config::PeerRegistryConfig;
pub use peer::{Peer, PeerId, PeerStatus};
pub use registry::PeerRegistry;
