//! `ps-spatial` — road graph and shortest-path routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadGraph` (edge arrays + adjacency matrix), builder       |
//! | [`router`]  | `EdgeWeights`, `Router`, `ShortestPathTree`, `reconstruct`  |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Per-origin Dijkstra runs on Rayon's thread pool.         |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `ps-core` types.    |

pub mod error;
pub mod network;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use network::{RoadGraph, RoadGraphBuilder};
pub use router::{
    reconstruct, EdgeWeights, Router, ShortestPathForest, ShortestPathTree, StaticLengths,
    WeightMatrix,
};
