//! Beacon Server
//!
//! HTTP boundary for the Beacon registries: request validation, DTO
//! mapping and the axum router. All registry semantics live in
//! `beacon-registry` and `beacon-cluster`; this crate only translates
//! between HTTP and the registry contracts.

pub mod api;
pub mod models;
pub mod state;

pub use state::{AppState, StateError};
