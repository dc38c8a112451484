//! Lock-free client registry.
//!
//! TigerStyle: one atomic publish per mutation, observable retries, no
//! hidden background work.
//!
//! Two-level store: application -> immutable snapshot of that application's
//! member map. The snapshot `Arc` is the unit of compare-and-swap: a writer
//! clones the map it read, applies its change, and publishes the clone only
//! if the slot still holds the exact snapshot it started from (pointer
//! identity). Losing writers reload the latest snapshot and retry; retries
//! are unbounded. Readers never block writers and vice versa.
//!
//! Expiry is lazy: every public operation scoped to an application first
//! sweeps that application's expired leases. There is no background
//! sweeper task.

use crate::config::ClientRegistryConfig;
use crate::registration::{ClientRegistration, ClientStatus};
use beacon_core::constants::LEASE_TIMEOUT_MS_NEVER;
use beacon_core::io::{Clock, WallClock};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type MemberMap = HashMap<String, ClientRegistration>;

/// Lease-based store of client registrations, keyed by
/// `(application, instance_id)`.
#[derive(Debug)]
pub struct ClientRegistry {
    applications: DashMap<String, Arc<MemberMap>>,
    lease_timeout_ms: u64,
    clock: Arc<dyn Clock>,
}

impl ClientRegistry {
    /// Registry with the default lease timeout and the system clock.
    pub fn new() -> Self {
        Self::with_config(ClientRegistryConfig::default())
    }

    /// Registry that never expires entries.
    pub fn non_expiring() -> Self {
        Self::with_config(ClientRegistryConfig::non_expiring())
    }

    /// Registry with the given configuration and the system clock.
    pub fn with_config(config: ClientRegistryConfig) -> Self {
        Self::with_clock(config, Arc::new(WallClock::new()))
    }

    /// Registry with an injected clock, for driving time in tests.
    pub fn with_clock(config: ClientRegistryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            applications: DashMap::new(),
            lease_timeout_ms: config.lease_timeout_ms,
            clock,
        }
    }

    /// Insert or overwrite the registration under
    /// `(application, registration.instance_id)`.
    ///
    /// The stored value always carries status COLD, regardless of the input
    /// or of any previous entry; the instance proves itself UP through
    /// renewals. Idempotent as an upsert. Triggers an expiry sweep for the
    /// application afterwards (the fresh entry itself cannot expire).
    pub fn register(&self, application: &str, registration: ClientRegistration) {
        let stamped = registration.with_status(ClientStatus::Cold);
        let instance_id = stamped.instance_id.clone();

        match self.applications.entry(application.to_owned()) {
            Entry::Occupied(mut slot) => {
                let mut next = (**slot.get()).clone();
                next.insert(instance_id.clone(), stamped);
                slot.insert(Arc::new(next));
            }
            Entry::Vacant(slot) => {
                let mut members = MemberMap::with_capacity(1);
                members.insert(instance_id.clone(), stamped);
                slot.insert(Arc::new(members));
            }
        }

        self.evict_expired(application);

        debug!(application, %instance_id, "registered client instance");
    }

    /// Renew the lease of `(application, instance_id)`.
    ///
    /// Optimistic update loop: snapshot the member map, derive the renewed
    /// record, publish the rebuilt map with one conditional swap and retry
    /// on interference. Returns `false` iff the instance is absent from the
    /// snapshot the winning attempt was built on.
    pub fn renew_instance(&self, application: &str, instance_id: &str) -> bool {
        self.evict_expired(application);

        let mut current = match self.applications.get(application) {
            Some(slot) => Arc::clone(slot.value()),
            None => return false,
        };

        loop {
            let Some(existing) = current.get(instance_id) else {
                return false;
            };

            let renewed = existing.renewed(self.clock.now_ms());
            let status = renewed.status;
            let renewals = renewed.renewals_since_registration;

            let mut next = (*current).clone();
            next.insert(instance_id.to_owned(), renewed);

            match self.applications.entry(application.to_owned()) {
                Entry::Occupied(mut slot) => {
                    if Arc::ptr_eq(slot.get(), &current) {
                        slot.insert(Arc::new(next));
                        debug!(application, instance_id, %status, renewals, "renewed client lease");
                        return true;
                    }
                    // Another writer got there first; retry on its result.
                    current = Arc::clone(slot.get());
                }
                Entry::Vacant(_) => return false,
            }
        }
    }

    /// Remove `(application, instance_id)`.
    ///
    /// Each attempt filters already-expired members while cloning; if the
    /// result is empty the whole application slot is removed instead, so no
    /// empty member map is left behind. Returns `true` iff the target was
    /// present (and unexpired) in the winning attempt.
    pub fn deregister(&self, application: &str, instance_id: &str) -> bool {
        let mut current = match self.applications.get(application) {
            Some(slot) => Arc::clone(slot.value()),
            None => return false,
        };

        loop {
            let mut next = self.live_members(&current);
            let removed = next.remove(instance_id).is_some();

            let swapped = if next.is_empty() {
                self.applications
                    .remove_if(application, |_, snapshot| Arc::ptr_eq(snapshot, &current))
                    .is_some()
            } else {
                match self.applications.entry(application.to_owned()) {
                    Entry::Occupied(mut slot) => {
                        if Arc::ptr_eq(slot.get(), &current) {
                            slot.insert(Arc::new(next));
                            true
                        } else {
                            false
                        }
                    }
                    Entry::Vacant(_) => return false,
                }
            };

            if swapped {
                if removed {
                    debug!(application, instance_id, "deregistered client instance");
                }
                return removed;
            }

            current = match self.applications.get(application) {
                Some(slot) => Arc::clone(slot.value()),
                None => return false,
            };
        }
    }

    /// All current registrations of an application, as a cloned snapshot.
    pub fn find_all_by_application(&self, application: &str) -> Vec<ClientRegistration> {
        self.evict_expired(application);

        match self.applications.get(application) {
            Some(slot) => slot.value().values().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// A single registration by composite key.
    pub fn find_one_by_application_and_instance_id(
        &self,
        application: &str,
        instance_id: &str,
    ) -> Option<ClientRegistration> {
        self.evict_expired(application);

        self.applications
            .get(application)
            .and_then(|slot| slot.value().get(instance_id).cloned())
    }

    /// Number of application groups currently tracked.
    ///
    /// Deregistering or expiring the last member of a group removes the
    /// group itself, so this never counts empty groups.
    pub fn application_count(&self) -> usize {
        self.applications.len()
    }

    /// Sweep expired leases out of one application's member map.
    ///
    /// Same compare-and-swap discipline as the mutating operations; if the
    /// sweep would leave the map empty the application slot is removed
    /// conditionally instead.
    fn evict_expired(&self, application: &str) {
        if self.lease_timeout_ms == LEASE_TIMEOUT_MS_NEVER {
            return;
        }

        loop {
            let current = match self.applications.get(application) {
                Some(slot) => Arc::clone(slot.value()),
                None => return,
            };

            let live = self.live_members(&current);
            if live.len() == current.len() {
                return;
            }

            let swapped = if live.is_empty() {
                self.applications
                    .remove_if(application, |_, snapshot| Arc::ptr_eq(snapshot, &current))
                    .is_some()
            } else {
                match self.applications.entry(application.to_owned()) {
                    Entry::Occupied(mut slot) => {
                        if Arc::ptr_eq(slot.get(), &current) {
                            slot.insert(Arc::new(live));
                            true
                        } else {
                            false
                        }
                    }
                    Entry::Vacant(_) => return,
                }
            };

            if swapped {
                return;
            }
        }
    }

    /// Clone a member map, dropping entries whose lease has lapsed.
    fn live_members(&self, members: &MemberMap) -> MemberMap {
        let now_ms = self.clock.now_ms();
        let mut live = MemberMap::with_capacity(members.len());

        for (instance_id, registration) in members {
            if self.lease_timeout_ms == LEASE_TIMEOUT_MS_NEVER
                || !registration.lease_expired(now_ms, self.lease_timeout_ms)
            {
                live.insert(instance_id.clone(), registration.clone());
            } else {
                debug!(
                    application = %registration.application,
                    %instance_id,
                    "expiring client lease"
                );
            }
        }

        live
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
