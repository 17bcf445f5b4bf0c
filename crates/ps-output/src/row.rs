//! Plain data row types written by output backends.

use ps_search::{SearchOutcome, Strategy};

/// One successful search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeRow {
    pub run:      u32,
    pub vehicle:  u32,
    pub space:    u32,
    pub strategy: Strategy,
    /// Step the space was claimed at.
    pub step:     u64,
    pub elapsed:  u64,
    pub distance: f64,
}

impl OutcomeRow {
    pub fn from_outcome(run: u32, outcome: &SearchOutcome) -> Self {
        Self {
            run,
            vehicle:  outcome.vehicle.0,
            space:    outcome.space.0,
            strategy: outcome.strategy,
            step:     outcome.step.0,
            elapsed:  outcome.elapsed,
            distance: outcome.distance,
        }
    }

    pub fn strategy_label(&self) -> &'static str {
        match self.strategy {
            Strategy::Individual => "individual",
            Strategy::Cooperative => "cooperative",
        }
    }
}

/// Running totals at the end of one step.  Counters are cumulative within
/// the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSummaryRow {
    pub run:       u32,
    pub step:      u64,
    pub searching: u64,
    pub parked:    u64,
    pub failed:    u64,
    pub removed:   u64,
}
