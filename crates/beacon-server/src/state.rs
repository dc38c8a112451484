//! Shared server state and the boundary service layer.
//!
//! Validation happens here, before anything reaches the registries: empty
//! identifiers and unparseable addresses are rejected at this layer, never
//! inside the core (the registries treat misses as booleans/options, not
//! errors).

use crate::models::{PeerDto, RegisterInstanceRequest};
use beacon_cluster::{Peer, PeerRegistry, PeerRegistryConfig};
use beacon_core::config::BeaconConfig;
use beacon_core::io::{Clock, WallClock};
use beacon_registry::{ClientRegistration, ClientRegistry, ClientRegistryConfig};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Boundary-layer failures.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("failed to register client: {reason}")]
    InvalidRegistration { reason: String },

    #[error("invalid peer payload: {reason}")]
    InvalidPeer { reason: String },
}

/// Server-wide shared state; cheap to clone into handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    clients: ClientRegistry,
    peers: PeerRegistry,
    clock: Arc<dyn Clock>,
    started_at: Instant,
}

impl AppState {
    /// Build state from configuration, using the system clock.
    pub fn new(config: &BeaconConfig) -> Self {
        Self::with_clock(config, Arc::new(WallClock::new()))
    }

    /// Build state with an injected clock, for tests.
    pub fn with_clock(config: &BeaconConfig, clock: Arc<dyn Clock>) -> Self {
        let clients = ClientRegistry::with_clock(
            ClientRegistryConfig::with_lease_timeout_ms(config.registry.lease_timeout_ms),
            clock.clone(),
        );
        let peers = PeerRegistry::with_providers(
            PeerRegistryConfig::default()
                .with_eviction_timeout_ms(config.cluster.down_peer_eviction_timeout_ms)
                .with_seed_node_weight(config.cluster.seed_node_weight),
            clock.clone(),
            Arc::new(beacon_core::io::StdRngProvider::new()),
        );

        Self {
            inner: Arc::new(AppStateInner {
                clients,
                peers,
                clock,
                started_at: Instant::now(),
            }),
        }
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.inner.clients
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.inner.peers
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.inner.started_at.elapsed().as_secs()
    }

    // =========================================================================
    // Instance operations
    // =========================================================================

    /// Validate and register a client instance; returns the stored record.
    pub fn register_instance(
        &self,
        app_id: &str,
        instance_id: &str,
        request: RegisterInstanceRequest,
    ) -> Result<ClientRegistration, StateError> {
        if app_id.trim().is_empty() || instance_id.trim().is_empty() {
            return Err(StateError::InvalidRegistration {
                reason: "application id and instance id are required".into(),
            });
        }

        let ip_address: IpAddr =
            request
                .ip_address
                .parse()
                .map_err(|_| StateError::InvalidRegistration {
                    reason: format!("unparseable ip address '{}'", request.ip_address),
                })?;

        let registration = ClientRegistration::new(
            app_id,
            instance_id,
            request.host,
            request.port,
            ip_address,
            self.inner.clock.now_ms(),
        );

        self.inner.clients.register(app_id, registration.clone());
        Ok(registration)
    }

    // =========================================================================
    // Peer operations
    // =========================================================================

    /// Validate a peer payload and upsert it.
    pub fn register_peer(&self, dto: PeerDto) -> Result<Peer, StateError> {
        let peer = self.peer_from_dto(dto)?;
        self.inner.peers.add(peer.clone());
        Ok(peer)
    }

    /// Validate and bulk-upsert a batch of peers.
    pub fn register_peers(&self, dtos: Vec<PeerDto>) -> Result<usize, StateError> {
        let peers = dtos
            .into_iter()
            .map(|dto| self.peer_from_dto(dto))
            .collect::<Result<Vec<_>, _>>()?;

        let count = peers.len();
        self.inner.peers.add_all(peers);
        Ok(count)
    }

    fn peer_from_dto(&self, dto: PeerDto) -> Result<Peer, StateError> {
        if dto.host.trim().is_empty() {
            return Err(StateError::InvalidPeer {
                reason: "host is required".into(),
            });
        }
        Ok(dto.into_peer(self.inner.clock.now_ms()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_cluster::{PeerId, PeerStatus};
    use beacon_core::io::ManualClock;
    use beacon_registry::ClientStatus;

    fn state() -> AppState {
        AppState::with_clock(&BeaconConfig::default(), Arc::new(ManualClock::new(1_000)))
    }

    fn register_request(ip: &str) -> RegisterInstanceRequest {
        RegisterInstanceRequest {
            host: "shop-1.local".into(),
            port: 8080,
            ip_address: ip.into(),
        }
    }

    fn peer_dto() -> PeerDto {
        PeerDto {
            id: PeerId::generate(),
            host: "node-1".into(),
            gossip_port: 7000,
            http_port: 8080,
            status: PeerStatus::Up,
            is_seed_node: false,
            heartbeats: 0,
            last_updated_ms: None,
            generation_timestamp_ms: None,
        }
    }

    #[test]
    fn test_register_instance_stores_cold_record() {
        let state = state();
        let stored = state
            .register_instance("shop", "i1", register_request("10.0.0.1"))
            .unwrap();

        assert_eq!(stored.status, ClientStatus::Cold);
        assert_eq!(stored.registration_timestamp_ms, 1_000);
        assert!(state
            .clients()
            .find_one_by_application_and_instance_id("shop", "i1")
            .is_some());
    }

    #[test]
    fn test_register_instance_rejects_empty_ids() {
        let state = state();
        assert!(matches!(
            state.register_instance("", "i1", register_request("10.0.0.1")),
            Err(StateError::InvalidRegistration { .. })
        ));
        assert!(matches!(
            state.register_instance("shop", "  ", register_request("10.0.0.1")),
            Err(StateError::InvalidRegistration { .. })
        ));
    }

    #[test]
    fn test_register_instance_rejects_bad_ip() {
        let state = state();
        let result = state.register_instance("shop", "i1", register_request("not-an-ip"));
        assert!(matches!(
            result,
            Err(StateError::InvalidRegistration { .. })
        ));
        // Nothing reached the registry.
        assert!(state.clients().find_all_by_application("shop").is_empty());
    }

    #[test]
    fn test_register_peer_stamps_clock() {
        let state = state();
        let peer = state.register_peer(peer_dto()).unwrap();

        assert_eq!(peer.last_updated_ms, 1_000);
        assert_eq!(state.peers().find_all().len(), 1);
    }

    #[test]
    fn test_register_peer_rejects_empty_host() {
        let state = state();
        let mut dto = peer_dto();
        dto.host = "".into();

        assert!(matches!(
            state.register_peer(dto),
            Err(StateError::InvalidPeer { .. })
        ));
    }

    #[test]
    fn test_register_peers_bulk() {
        let state = state();
        let count = state
            .register_peers(vec![peer_dto(), peer_dto(), peer_dto()])
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(state.peers().find_all().len(), 3);
    }
}
