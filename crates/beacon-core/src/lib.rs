//! Beacon Core
//!
//! Shared leaf concerns for the Beacon service-discovery registry:
//! time and randomness abstractions, configuration, constants, errors
//! and telemetry bootstrap.
//!
//! The registries in `beacon-registry` and `beacon-cluster` depend only
//! on this crate; neither depends on the other or on the transport layer.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod telemetry;

pub use config::BeaconConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use io::{Clock, ManualClock, RngProvider, StdRngProvider, WallClock};
pub use telemetry::{init_telemetry, TelemetryConfig};
