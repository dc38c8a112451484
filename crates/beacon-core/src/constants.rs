//! Workspace-wide constants.
//!
//! TigerStyle: all limits are explicit, use big-endian naming (most
//! significant part first) and carry their unit in the name.

// =============================================================================
// Client Registry
// =============================================================================

/// Number of successful lease renewals a client must accumulate while COLD
/// before its status is promoted to UP.
pub const CLIENT_RENEWALS_UNTIL_UP_COUNT: u64 = 3;

/// Default client lease timeout in milliseconds (30 sec).
pub const CLIENT_LEASE_TIMEOUT_MS_DEFAULT: u64 = 30_000;

/// Sentinel lease timeout that disables expiry entirely.
pub const LEASE_TIMEOUT_MS_NEVER: u64 = u64::MAX;

/// Maximum length of an application or instance identifier in bytes.
pub const CLIENT_ID_LENGTH_BYTES_MAX: usize = 256;

// =============================================================================
// Peer Registry
// =============================================================================

/// Default eviction timeout for peers marked DOWN, in milliseconds (30 sec).
pub const PEER_DOWN_EVICTION_TIMEOUT_MS_DEFAULT: u64 = 30_000;

/// Default sampling weight assigned to seed nodes.
pub const PEER_SEED_NODE_WEIGHT_DEFAULT: u64 = 3;

/// Default number of peers returned by a sampling request.
pub const PEER_SAMPLE_COUNT_DEFAULT: usize = 3;

// =============================================================================
// HTTP
// =============================================================================

/// Default bind address for the registry HTTP server.
pub const HTTP_BIND_ADDRESS_DEFAULT: &str = "0.0.0.0:8761";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_are_sane() {
        assert!(CLIENT_RENEWALS_UNTIL_UP_COUNT >= 1);
        assert!(CLIENT_LEASE_TIMEOUT_MS_DEFAULT < LEASE_TIMEOUT_MS_NEVER);
        assert!(PEER_SEED_NODE_WEIGHT_DEFAULT >= 1);
    }
}
