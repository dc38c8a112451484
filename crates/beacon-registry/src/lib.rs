//! Beacon Registry
//!
//! Lease-based registry of application instances. Instances register
//! themselves, renew a time-bounded lease via heartbeats and are queried by
//! consumers; entries whose lease lapses are evicted lazily on the next
//! operation touching their application.
//!
//! # Concurrency
//!
//! There are no locks around registry state. Every mutation builds a full
//! replacement snapshot of the per-application member map and publishes it
//! with a single atomic compare-and-swap against the slot it was read from;
//! losing writers retry against the latest snapshot. Updates to a single
//! `(application, instance_id)` key are therefore linearizable.

pub mod config;
pub mod registration;
pub mod registry;

pub use config::ClientRegistryConfig;
pub use registration::{ClientRegistration, ClientStatus};
pub use registry::ClientRegistry;
