//! Fleet deployment core types.
//!
//! Shapes of the deployment records reported by the deployments backend,
//! the names of the device-status buckets those records aggregate into,
//! and the `fleet.toml` configuration shared by the rollout engine and
//! `fleetctl`.

pub mod buckets;
pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use config::FleetConfig;
pub use error::{CoreError, CoreResult};
pub use stats::{DisplayState, GroupedStats};
pub use types::*;
