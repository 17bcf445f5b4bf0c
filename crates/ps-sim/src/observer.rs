//! Run observer trait for progress reporting and data collection.

use ps_core::{Step, VehicleId};
use ps_search::{SearchFailure, SearchOutcome};

use crate::RunSummary;

/// Callbacks invoked by [`Runner`][crate::Runner] at key points of the step
/// loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — parked counter
///
/// ```rust,ignore
/// struct Parked(usize);
///
/// impl SearchObserver for Parked {
///     fn on_parked(&mut self, _outcome: &SearchOutcome) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SearchObserver {
    /// Called right after the engine advanced, before any vehicle is handled.
    fn on_step_start(&mut self, _step: Step) {}

    /// Called at the end of each step.  `searching` is the number of
    /// vehicles still looking for a space.
    fn on_step_end(&mut self, _step: Step, _searching: usize) {}

    /// A vehicle claimed a space.
    fn on_parked(&mut self, _outcome: &SearchOutcome) {}

    /// A search ended without a space (no route, or a dead end).
    fn on_failure(&mut self, _vehicle: VehicleId, _failure: SearchFailure, _step: Step) {}

    /// The engine let an unparked vehicle go.
    fn on_removed(&mut self, _vehicle: VehicleId, _step: Step) {}

    /// Called once after the last step.
    fn on_run_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SearchObserver`] that does nothing.
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}
