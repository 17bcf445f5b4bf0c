//! `ps-parking` — where vehicles can park and which spaces are free.
//!
//! | Module       | Contents                                          |
//! |--------------|---------------------------------------------------|
//! | [`registry`] | `ParkingSpace`, `ParkingSpaceRegistry`            |
//! | [`error`]    | `ParkingError`, `ParkingResult<T>`                |
//!
//! Spaces are laid out once per run by scanning every edge of the road graph
//! (see [`ParkingSpaceRegistry::scan`]); a random subset is then marked
//! available.  A claim is permanent for the rest of the run.

pub mod error;
pub mod registry;


pub use error::{ParkingError, ParkingResult};
pub use registry::{ParkingSpace, ParkingSpaceRegistry};
