//! `ps-core` — foundational types for the parking search workspace.
//!
//! This crate is a dependency of every other `ps-*` crate.  It has no `ps-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                |
//! |------------|---------------------------------------------------------|
//! | [`ids`]    | `VehicleId`, `NodeId`, `EdgeId`, `SpaceId`              |
//! | [`time`]   | `Step`                                                  |
//! | [`rng`]    | `VehicleRng` (per-vehicle), `SimRng` (run-level)        |
//! | [`config`] | `SearchConfig`, `ScanParams`                            |
//! | [`error`]  | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{ScanParams, SearchConfig};
pub use error::{CoreError, CoreResult};
pub use ids::{EdgeId, NodeId, SpaceId, VehicleId};
pub use rng::{SimRng, VehicleRng};
pub use time::Step;
