//! Client registration record and lease state machine.

use beacon_core::constants::CLIENT_RENEWALS_UNTIL_UP_COUNT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// The renewal counter keeps its top bit clear: the increment masks it off
/// instead of wrapping to zero on overflow.
pub(crate) const RENEWAL_COUNT_MASK: u64 = u64::MAX >> 1;

/// Lease status of a client instance.
///
/// A fresh registration starts COLD and is promoted to UP after enough
/// renewals; the transition is monotonic, there is no way back to COLD.
/// There is no DOWN state for clients: an expired lease removes the entry
/// outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// Registered but not yet proven alive by heartbeats.
    Cold,
    /// Actively renewing its lease.
    Up,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cold => write!(f, "cold"),
            Self::Up => write!(f, "up"),
        }
    }
}

/// One running instance of an application.
///
/// Immutable value type: every mutation derives a new record through the
/// `with_*`/`renewed` constructors, never an in-place field update. The pair
/// `(application, instance_id)` is unique across the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRegistration {
    /// Service group this instance belongs to.
    pub application: String,
    /// Unique identifier within the application group.
    pub instance_id: String,
    /// Hostname the instance is reachable at.
    pub host: String,
    /// Port the instance serves on.
    pub port: u16,
    /// Resolved network address.
    pub ip_address: IpAddr,
    /// When the instance first registered (Unix ms).
    pub registration_timestamp_ms: u64,
    /// When the lease was last renewed (Unix ms).
    pub last_renewal_timestamp_ms: u64,
    /// Successful renewals since registration. Monotonically non-decreasing
    /// apart from the top-bit mask.
    pub renewals_since_registration: u64,
    /// Current lease status.
    pub status: ClientStatus,
}

impl ClientRegistration {
    /// Build a fresh registration: both timestamps stamped from `now_ms`,
    /// renewal counter at zero, status COLD.
    pub fn new(
        application: impl Into<String>,
        instance_id: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        ip_address: IpAddr,
        now_ms: u64,
    ) -> Self {
        Self {
            application: application.into(),
            instance_id: instance_id.into(),
            host: host.into(),
            port,
            ip_address,
            registration_timestamp_ms: now_ms,
            last_renewal_timestamp_ms: now_ms,
            renewals_since_registration: 0,
            status: ClientStatus::Cold,
        }
    }

    /// Derive a copy with the given status.
    pub fn with_status(mut self, status: ClientStatus) -> Self {
        self.status = status;
        self
    }

    /// Derive the record produced by one successful lease renewal at
    /// `now_ms`: renewal timestamp updated, counter bumped under the
    /// top-bit mask, and COLD promoted to UP once the counter reaches the
    /// threshold.
    pub fn renewed(&self, now_ms: u64) -> Self {
        let count = self.renewals_since_registration.wrapping_add(1) & RENEWAL_COUNT_MASK;
        let status = if count >= CLIENT_RENEWALS_UNTIL_UP_COUNT && self.status == ClientStatus::Cold
        {
            ClientStatus::Up
        } else {
            self.status
        };

        Self {
            last_renewal_timestamp_ms: now_ms,
            renewals_since_registration: count,
            status,
            ..self.clone()
        }
    }

    /// Whether the lease has lapsed at `now_ms` for the given timeout.
    pub fn lease_expired(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_renewal_timestamp_ms) >= timeout_ms
    }
}
