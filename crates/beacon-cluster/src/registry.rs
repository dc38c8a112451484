//! Concurrent peer registry.
//!
//! TigerStyle: whole-value upserts, conditional removal, no partial
//! updates.
//!
//! A single flat map: cluster size is small and membership is globally
//! relevant, so there is no per-group nesting as in the client registry.
//! Writes are plain last-writer-wins upserts (each peer's slot is
//! independent, a whole-value replace is always safe); the only
//! conditional operation is eviction, which removes a DOWN peer only if
//! its record is still the exact value the sweep observed, so a peer
//! re-upserted mid-sweep survives.

use crate::config::PeerRegistryConfig;
use crate::peer::{Peer, PeerId};
use beacon_core::constants::LEASE_TIMEOUT_MS_NEVER;
use beacon_core::io::{Clock, RngProvider, StdRngProvider, WallClock};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Registry of known cluster peers.
#[derive(Debug)]
pub struct PeerRegistry {
    peers: DashMap<PeerId, Peer>,
    /// Eviction timeout for DOWN peers, in nanoseconds; `u64::MAX` disables
    /// eviction.
    down_eviction_timeout_nanos: u64,
    seed_node_weight: u64,
    clock: Arc<dyn Clock>,
    rng: Arc<dyn RngProvider>,
}

impl PeerRegistry {
    /// Registry with default configuration, system clock and seeded RNG.
    pub fn new() -> Self {
        Self::with_config(PeerRegistryConfig::default())
    }

    /// Registry with the given configuration.
    pub fn with_config(config: PeerRegistryConfig) -> Self {
        Self::with_providers(
            config,
            Arc::new(WallClock::new()),
            Arc::new(StdRngProvider::new()),
        )
    }

    /// Registry with injected clock and RNG, for deterministic tests.
    pub fn with_providers(
        config: PeerRegistryConfig,
        clock: Arc<dyn Clock>,
        rng: Arc<dyn RngProvider>,
    ) -> Self {
        let down_eviction_timeout_nanos =
            if config.down_peer_eviction_timeout_ms == LEASE_TIMEOUT_MS_NEVER {
                u64::MAX
            } else {
                config
                    .down_peer_eviction_timeout_ms
                    .saturating_mul(1_000_000)
            };

        Self {
            peers: DashMap::new(),
            down_eviction_timeout_nanos,
            seed_node_weight: config.seed_node_weight,
            clock,
            rng,
        }
    }

    /// Insert or overwrite a peer by id, then sweep stale DOWN peers.
    pub fn add(&self, peer: Peer) {
        let peer_id = peer.id;
        let status = peer.status;
        self.peers.insert(peer_id, peer);
        self.evict_expired();

        debug!(peer_id = %peer_id, %status, "registered peer");
    }

    /// Bulk upsert, useful during catch-up or start-up, then sweep.
    pub fn add_all(&self, peers: impl IntoIterator<Item = Peer>) {
        for peer in peers {
            self.peers.insert(peer.id, peer);
        }
        self.evict_expired();
    }

    /// All known peers, as a cloned snapshot.
    pub fn find_all(&self) -> Vec<Peer> {
        self.evict_expired();
        self.peers.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of peers currently tracked.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Up to `count` distinct UP peers, seed nodes favoured.
    ///
    /// If the UP population is no larger than `count` it is returned
    /// whole. Otherwise each UP peer gets a weight (`seed_node_weight` for
    /// seeds, 1 for the rest), a cumulative-weight array is built over the
    /// population, and draws in `[1, total]` are resolved by lower-bound
    /// binary search; draws landing on an already-chosen peer are
    /// discarded and repeated. Weights are not removed on selection, so
    /// convergence is probabilistic and degrades as `count` approaches the
    /// UP population size; an accepted limitation, gossip fanouts stay far
    /// below cluster size.
    pub fn sample(&self, count: usize) -> Vec<Peer> {
        self.evict_expired();

        let up_peers: Vec<Peer> = self
            .peers
            .iter()
            .filter(|entry| entry.value().is_up())
            .map(|entry| entry.value().clone())
            .collect();

        if up_peers.len() <= count {
            return up_peers;
        }

        let mut cumulative_weights = Vec::with_capacity(up_peers.len());
        let mut total_weight = 0u64;
        for peer in &up_peers {
            total_weight += if peer.is_seed_node {
                self.seed_node_weight
            } else {
                1
            };
            cumulative_weights.push(total_weight);
        }

        let mut chosen_indices = HashSet::with_capacity(count);
        let mut sampled = Vec::with_capacity(count);

        while sampled.len() < count {
            let draw = self.rng.gen_range(1, total_weight + 1);
            // First index whose cumulative weight covers the draw; wider
            // windows make heavier peers proportionally more likely.
            let index = cumulative_weights.partition_point(|&weight| weight < draw);

            if chosen_indices.insert(index) {
                sampled.push(up_peers[index].clone());
            }
        }

        sampled
    }

    /// Remove DOWN peers whose record has been stale for at least the
    /// eviction timeout.
    ///
    /// The removal compares the full stored value against the snapshot the
    /// sweep observed: a peer concurrently re-upserted between the scan and
    /// the removal no longer matches and is left alone.
    fn evict_expired(&self) {
        if self.down_eviction_timeout_nanos == u64::MAX {
            return;
        }

        let now_nanos = self.clock.now_nanos();

        let stale: Vec<Peer> = self
            .peers
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .down_longer_than(now_nanos, self.down_eviction_timeout_nanos)
            })
            .map(|entry| entry.value().clone())
            .collect();

        for peer in stale {
            let removed = self
                .peers
                .remove_if(&peer.id, |_, current| *current == peer)
                .is_some();
            if removed {
                debug!(peer_id = %peer.id, "evicted down peer");
            }
        }
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::PeerStatus;
    use beacon_core::io::ManualClock;
    use std::collections::HashMap;

    const START_MS: u64 = 1_000_000_000;
    const EVICTION_TIMEOUT_MS: u64 = 10_000;

    fn peer(status: PeerStatus, is_seed_node: bool, now_ms: u64) -> Peer {
        Peer::new(PeerId::generate(), "localhost", 7000, 8080, is_seed_node, now_ms)
            .with_status(status)
    }

    fn evicting_registry() -> (Arc<ManualClock>, PeerRegistry) {
        let clock = Arc::new(ManualClock::new(START_MS));
        let registry = PeerRegistry::with_providers(
            PeerRegistryConfig::default().with_eviction_timeout_ms(EVICTION_TIMEOUT_MS),
            clock.clone(),
            Arc::new(StdRngProvider::with_seed(42)),
        );
        (clock, registry)
    }

    fn non_evicting_registry() -> PeerRegistry {
        let clock = Arc::new(ManualClock::new(START_MS));
        PeerRegistry::with_providers(
            PeerRegistryConfig::non_evicting(),
            clock,
            Arc::new(StdRngProvider::with_seed(42)),
        )
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PeerRegistry>();
    }

    #[test]
    fn test_add_and_find_all() {
        let registry = non_evicting_registry();
        let added = peer(PeerStatus::Down, false, START_MS);

        registry.add(added.clone());

        let all = registry.find_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], added);
    }

    #[test]
    fn test_add_overwrites_by_id() {
        let registry = non_evicting_registry();
        let original = peer(PeerStatus::Joining, false, START_MS);

        registry.add(original.clone());
        let updated = original.clone().with_status(PeerStatus::Up);
        registry.add(updated.clone());

        let all = registry.find_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], updated);
    }

    #[test]
    fn test_eviction_on_find_all() {
        let (clock, registry) = evicting_registry();
        registry.add(peer(PeerStatus::Down, false, START_MS));
        registry.add(peer(PeerStatus::Up, false, START_MS));

        clock.advance(EVICTION_TIMEOUT_MS);

        let remaining = registry.find_all();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].status, PeerStatus::Up);
    }

    #[test]
    fn test_eviction_on_add() {
        let (clock, registry) = evicting_registry();
        registry.add(peer(PeerStatus::Down, false, START_MS));
        registry.add(peer(PeerStatus::Up, false, START_MS));

        clock.advance(EVICTION_TIMEOUT_MS);
        registry.add(peer(PeerStatus::Up, false, clock.now_ms()));

        assert_eq!(registry.peer_count(), 2);
        assert!(registry.find_all().iter().all(Peer::is_up));
    }

    #[test]
    fn test_eviction_on_add_all() {
        let (clock, registry) = evicting_registry();
        registry.add(peer(PeerStatus::Down, false, START_MS));
        registry.add(peer(PeerStatus::Up, false, START_MS));

        clock.advance(EVICTION_TIMEOUT_MS);
        registry.add_all(Vec::new());

        assert_eq!(registry.peer_count(), 1);
    }

    #[test]
    fn test_only_down_peers_are_evicted() {
        let (clock, registry) = evicting_registry();
        registry.add(peer(PeerStatus::Up, false, START_MS));
        registry.add(peer(PeerStatus::Joining, false, START_MS));
        registry.add(peer(PeerStatus::Sick, false, START_MS));

        clock.advance(EVICTION_TIMEOUT_MS * 100);

        // Age alone never evicts a peer that is not DOWN.
        assert_eq!(registry.find_all().len(), 3);
    }

    #[test]
    fn test_reupserted_peer_survives_sweep() {
        let (clock, registry) = evicting_registry();
        let stale = peer(PeerStatus::Down, false, START_MS);
        registry.add(stale.clone());

        clock.advance(EVICTION_TIMEOUT_MS);

        // Same id, fresh record: the stale snapshot no longer matches the
        // stored value, so the sweep must leave the peer in place.
        let mut refreshed = stale;
        refreshed.last_updated_ms = clock.now_ms();
        registry.add(refreshed.clone());

        let all = registry.find_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], refreshed);
    }

    #[test]
    fn test_sentinel_disables_eviction() {
        let registry = non_evicting_registry();
        registry.add(peer(PeerStatus::Down, false, 0));

        assert_eq!(registry.find_all().len(), 1);
    }

    #[test]
    fn test_sample_returns_distinct_up_peers() {
        let registry = non_evicting_registry();
        registry.add(peer(PeerStatus::Down, false, START_MS));
        registry.add(peer(PeerStatus::Up, true, START_MS));
        registry.add(peer(PeerStatus::Up, false, START_MS));
        registry.add(peer(PeerStatus::Up, false, START_MS));

        for _ in 0..100 {
            let sampled = registry.sample(2);
            assert_eq!(sampled.len(), 2);
            assert!(sampled.iter().all(Peer::is_up));
            assert_ne!(sampled[0].id, sampled[1].id);
        }
    }

    #[test]
    fn test_sample_caps_at_up_population() {
        let registry = non_evicting_registry();
        registry.add(peer(PeerStatus::Up, false, START_MS));
        registry.add(peer(PeerStatus::Up, false, START_MS));
        registry.add(peer(PeerStatus::Sick, false, START_MS));
        registry.add(peer(PeerStatus::Down, false, START_MS));

        let sampled = registry.sample(10);
        assert_eq!(sampled.len(), 2);
        assert!(sampled.iter().all(Peer::is_up));
    }

    #[test]
    fn test_sample_of_zero_is_empty() {
        let registry = non_evicting_registry();
        registry.add(peer(PeerStatus::Up, false, START_MS));

        assert!(registry.sample(0).is_empty());
    }

    #[test]
    fn test_seed_node_sampling_bias() {
        let registry = non_evicting_registry();
        let seed = peer(PeerStatus::Up, true, START_MS);
        registry.add(seed.clone());
        registry.add(peer(PeerStatus::Up, false, START_MS));
        registry.add(peer(PeerStatus::Up, false, START_MS));

        // With weights {3, 1, 1} a single draw lands on the seed node with
        // probability 3/5.
        let trials = 10_000;
        let mut seed_hits = 0usize;
        for _ in 0..trials {
            let sampled = registry.sample(1);
            assert_eq!(sampled.len(), 1);
            if sampled[0].id == seed.id {
                seed_hits += 1;
            }
        }

        let frequency = seed_hits as f64 / trials as f64;
        assert!(
            (0.55..=0.65).contains(&frequency),
            "seed frequency {frequency} outside expected band around 0.6"
        );
    }

    #[test]
    fn test_sample_distribution_covers_population() {
        let registry = non_evicting_registry();
        for _ in 0..3 {
            registry.add(peer(PeerStatus::Up, false, START_MS));
        }

        let mut hits: HashMap<PeerId, usize> = HashMap::new();
        for _ in 0..1_000 {
            for sampled in registry.sample(2) {
                *hits.entry(sampled.id).or_default() += 1;
            }
        }

        // Every peer shows up eventually.
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_concurrent_upserts_and_samples() {
        use std::thread;

        let registry = Arc::new(non_evicting_registry());
        let ids: Vec<PeerId> = (0..8).map(|_| PeerId::generate()).collect();
        for &id in &ids {
            registry.add(
                Peer::new(id, "localhost", 7000, 8080, false, START_MS)
                    .with_status(PeerStatus::Up),
            );
        }

        thread::scope(|scope| {
            let writer = Arc::clone(&registry);
            let writer_ids = ids.clone();
            scope.spawn(move || {
                for round in 0..500 {
                    let id = writer_ids[round % writer_ids.len()];
                    writer.add(
                        Peer::new(id, "localhost", 7000, 8080, round % 2 == 0, START_MS + 1)
                            .with_status(PeerStatus::Up),
                    );
                }
            });

            let reader = Arc::clone(&registry);
            scope.spawn(move || {
                for _ in 0..500 {
                    let sampled = reader.sample(3);
                    assert_eq!(sampled.len(), 3);
                    assert!(sampled.iter().all(Peer::is_up));
                }
            });
        });

        assert_eq!(registry.peer_count(), ids.len());
    }
}
