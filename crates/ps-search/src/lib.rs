//! `ps-search` — the parking search itself.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`routes`]  | `Trip`, `PlannedRoutes`, `RouteBook` (precomputed routes)  |
//! | [`vehicle`] | `SearchVehicle` state machine, `SearchOutcome`             |
//! | [`fleet`]   | `VehicleFleet` — id-indexed, creation-ordered vehicles     |
//! | [`error`]   | `SearchError`, `SearchResult<T>`                           |
//!
//! # Search model
//!
//! 1. Before the first step, [`RouteBook::precompute`] routes every trip
//!    twice: once over static lengths (individual) and once under the
//!    cooperative edge-weight strategy.
//! 2. On departure a [`SearchVehicle`] draws once from its own RNG to pick
//!    the strategy it keeps for the whole search.
//! 3. Every step the vehicle is told where it is; it tests the spaces it has
//!    passed on its current edge and claims the first available one.
//! 4. At the end of its route it picks a random continuation edge, never
//!    the immediate U-turn.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                               |
//! |------------|------------------------------------------------------|
//! | `fx-hash`  | `FxHashMap` for the fleet's id index                 |
//! | `parallel` | Per-origin route precomputation on Rayon             |

pub mod error;
pub mod fleet;
pub mod routes;
pub mod vehicle;


pub use error::{SearchError, SearchResult};
pub use fleet::VehicleFleet;
pub use routes::{PlannedRoutes, RouteBook, Trip};
pub use vehicle::{EdgePosition, SearchFailure, SearchOutcome, SearchState, SearchVehicle, Strategy};
