//! Request and response models for the registry API.

use beacon_cluster::{Peer, PeerId, PeerStatus};
use beacon_registry::ClientRegistration;
use serde::{Deserialize, Serialize};

// =============================================================================
// Instance models
// =============================================================================

/// Body of an instance registration request.
///
/// Application and instance identifiers travel in the path; the body
/// carries the connection details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInstanceRequest {
    /// Hostname the instance is reachable at.
    pub host: String,
    /// Port the instance serves on.
    pub port: u16,
    /// Network address as text; must parse to a valid IP.
    pub ip_address: String,
}

/// A client registration as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceResponse {
    pub application: String,
    pub instance_id: String,
    pub host: String,
    pub port: u16,
    pub ip_address: String,
    pub registration_timestamp_ms: u64,
    pub last_renewal_timestamp_ms: u64,
    pub renewals_since_registration: u64,
    pub status: String,
}

impl From<ClientRegistration> for InstanceResponse {
    fn from(registration: ClientRegistration) -> Self {
        Self {
            application: registration.application,
            instance_id: registration.instance_id,
            host: registration.host,
            port: registration.port,
            ip_address: registration.ip_address.to_string(),
            registration_timestamp_ms: registration.registration_timestamp_ms,
            last_renewal_timestamp_ms: registration.last_renewal_timestamp_ms,
            renewals_since_registration: registration.renewals_since_registration,
            status: registration.status.to_string(),
        }
    }
}

// =============================================================================
// Peer models
// =============================================================================

/// A peer as exchanged with the API, in both directions.
///
/// Timestamps may be omitted on registration; the server stamps them from
/// its own clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerDto {
    pub id: PeerId,
    pub host: String,
    pub gossip_port: u16,
    pub http_port: u16,
    pub status: PeerStatus,
    pub is_seed_node: bool,
    #[serde(default)]
    pub heartbeats: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_timestamp_ms: Option<u64>,
}

impl PeerDto {
    /// Convert into a registry record, stamping missing timestamps with
    /// `now_ms`.
    pub fn into_peer(self, now_ms: u64) -> Peer {
        Peer {
            id: self.id,
            host: self.host,
            gossip_port: self.gossip_port,
            http_port: self.http_port,
            status: self.status,
            is_seed_node: self.is_seed_node,
            last_updated_ms: self.last_updated_ms.unwrap_or(now_ms),
            generation_timestamp_ms: self.generation_timestamp_ms.unwrap_or(now_ms),
            heartbeats: self.heartbeats,
        }
    }
}

impl From<Peer> for PeerDto {
    fn from(peer: Peer) -> Self {
        Self {
            id: peer.id,
            host: peer.host,
            gossip_port: peer.gossip_port,
            http_port: peer.http_port,
            status: peer.status,
            is_seed_node: peer.is_seed_node,
            heartbeats: peer.heartbeats,
            last_updated_ms: Some(peer.last_updated_ms),
            generation_timestamp_ms: Some(peer.generation_timestamp_ms),
        }
    }
}

/// Acknowledgement of a bulk peer registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPeersResponse {
    pub registered: usize,
}

// =============================================================================
// Envelope models
// =============================================================================

/// Error body returned for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::new("not_found", format!("{resource} '{id}' not found"))
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_registry::ClientStatus;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_instance_response_mapping() {
        let registration = ClientRegistration::new(
            "shop",
            "i1",
            "shop-1.local",
            8080,
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            1_000,
        );

        let response = InstanceResponse::from(registration);
        assert_eq!(response.application, "shop");
        assert_eq!(response.ip_address, "10.0.0.1");
        assert_eq!(response.status, ClientStatus::Cold.to_string());
        assert_eq!(response.renewals_since_registration, 0);
    }

    #[test]
    fn test_peer_dto_round_trip_stamps_timestamps() {
        let dto = PeerDto {
            id: PeerId::generate(),
            host: "node-1".into(),
            gossip_port: 7000,
            http_port: 8080,
            status: PeerStatus::Up,
            is_seed_node: true,
            heartbeats: 7,
            last_updated_ms: None,
            generation_timestamp_ms: None,
        };

        let peer = dto.into_peer(42_000);
        assert_eq!(peer.last_updated_ms, 42_000);
        assert_eq!(peer.generation_timestamp_ms, 42_000);
        assert_eq!(peer.heartbeats, 7);

        let back = PeerDto::from(peer);
        assert_eq!(back.last_updated_ms, Some(42_000));
    }

    #[test]
    fn test_peer_dto_deserializes_without_optional_fields() {
        let dto: PeerDto = serde_json::from_str(
            r#"{
                "id": "6e9bb1c9-9614-4dbd-89f9-7aafbbf3774b",
                "host": "node-1",
                "gossip_port": 7000,
                "http_port": 8080,
                "status": "up",
                "is_seed_node": false
            }"#,
        )
        .unwrap();

        assert_eq!(dto.heartbeats, 0);
        assert!(dto.last_updated_ms.is_none());
    }
}
