//! `ps-sim` — drives parking search runs.
//!
//! # Step loop
//!
//! ```text
//! until the engine expects no more vehicles or max_steps is reached:
//!   ① Advance   — TrafficEngine::advance moves every vehicle one step.
//!   ② Departed  — create a SearchVehicle, hand its route to the engine;
//!                 vehicles without a route are removed at once.
//!   ③ Arrived   — vehicles the engine let go; unparked ones count as removed.
//!   ④ Evaluate  — every live vehicle, in creation order, checks the spaces
//!                 it passed; parked vehicles are stopped in the engine.
//!   ⑤ Exhausted — vehicles at the end of their route get a continuation
//!                 edge; dead-ended ones are taken off the network.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Route precomputation on Rayon's thread pool.           |
//! | `fx-hash`  | FxHash for the fleet's id index.                       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ps_core::SearchConfig;
//! use ps_sim::{ConstantSpeedEngine, NoopObserver, Runner, SessionBuilder, TripGenerator};
//!
//! let session = SessionBuilder::new(&graph, config)
//!     .demand(TripGenerator::entries(&graph)?)
//!     .run(0)
//!     .build()?;
//! let engine = ConstantSpeedEngine::new(&graph, 10.0, session.trips())?;
//! let summary = Runner::new(session, engine).run(&mut NoopObserver)?;
//! println!("success rate {:.2}", summary.success_rate());
//! ```

pub mod builder;
pub mod demand;
pub mod engine;
pub mod error;
pub mod observer;
pub mod runner;
pub mod session;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::SessionBuilder;
pub use demand::TripGenerator;
pub use engine::{ConstantSpeedEngine, EngineStep, TrafficEngine};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SearchObserver};
pub use runner::Runner;
pub use session::SearchSession;
pub use summary::RunSummary;
