//! Per-run search statistics.

use ps_search::{SearchOutcome, Strategy};

/// Counts and per-vehicle metrics of one run (or several, after
/// [`absorb`](Self::absorb)).
///
/// Every departed vehicle ends up in exactly one of `parked`, `removed`,
/// `unreachable`, `dead_ends` or `still_searching`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub departed:        usize,
    pub parked:          usize,
    /// Let go by the engine without a space.
    pub removed:         usize,
    pub unreachable:     usize,
    pub dead_ends:       usize,
    /// Still searching when the run stopped.
    pub still_searching: usize,

    pub cooperative_departed: usize,
    pub cooperative_parked:   usize,

    /// Search time of every parked vehicle, in steps.
    pub search_steps:     Vec<u64>,
    /// Search distance of every parked vehicle, in metres.
    pub search_distances: Vec<f64>,
}

impl RunSummary {
    pub fn record_departure(&mut self, strategy: Strategy) {
        self.departed += 1;
        if strategy == Strategy::Cooperative {
            self.cooperative_departed += 1;
        }
    }

    pub fn record_parked(&mut self, outcome: &SearchOutcome) {
        self.parked += 1;
        if outcome.strategy == Strategy::Cooperative {
            self.cooperative_parked += 1;
        }
        self.search_steps.push(outcome.elapsed);
        self.search_distances.push(outcome.distance);
    }

    /// Vehicles that finished their search, with or without a space.
    /// Routing failures and unfinished searches are left out.
    pub fn finished(&self) -> usize {
        self.parked + self.removed
    }

    /// `parked / finished`, or `0.0` if nobody finished.
    pub fn success_rate(&self) -> f64 {
        match self.finished() {
            0 => 0.0,
            n => self.parked as f64 / n as f64,
        }
    }

    pub fn mean_search_steps(&self) -> Option<f64> {
        mean(self.search_steps.iter().map(|&s| s as f64))
    }

    pub fn mean_search_distance(&self) -> Option<f64> {
        mean(self.search_distances.iter().copied())
    }

    /// Fold another run into this one.
    pub fn absorb(&mut self, other: &RunSummary) {
        self.departed             += other.departed;
        self.parked               += other.parked;
        self.removed              += other.removed;
        self.unreachable          += other.unreachable;
        self.dead_ends            += other.dead_ends;
        self.still_searching      += other.still_searching;
        self.cooperative_departed += other.cooperative_departed;
        self.cooperative_parked   += other.cooperative_parked;
        self.search_steps.extend_from_slice(&other.search_steps);
        self.search_distances.extend_from_slice(&other.search_distances);
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    Some(values.sum::<f64>() / n as f64)
}
