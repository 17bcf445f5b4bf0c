//! Run configuration.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and validated once before any run starts.

use crate::{CoreError, CoreResult};

// ── ScanParams ────────────────────────────────────────────────────────────────

/// Geometry of the parking-space scan along each edge, in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScanParams {
    /// Only edges strictly longer than this carry parking spaces.
    pub min_edge_length: f64,
    /// Offset of the first space from the edge start.  Leaves room for a
    /// vehicle entering the edge to stop at the first space.
    pub start_offset: f64,
    /// Distance between consecutive spaces.
    pub spacing: f64,
    /// No space is placed within this distance of the edge end.
    pub end_margin: f64,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            min_edge_length: 40.0,
            start_offset:    18.0,
            spacing:         7.0,
            end_margin:      10.0,
        }
    }
}

impl ScanParams {
    pub fn validate(&self) -> CoreResult<()> {
        let all = [self.min_edge_length, self.start_offset, self.spacing, self.end_margin];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(CoreError::Config(format!(
                "scan parameters must be finite and non-negative, got {self:?}"
            )));
        }
        if self.spacing <= 0.0 {
            return Err(CoreError::Config(format!(
                "scan spacing must be positive, got {}",
                self.spacing
            )));
        }
        Ok(())
    }
}

// ── SearchConfig ──────────────────────────────────────────────────────────────

/// Top-level configuration for a batch of parking search runs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Number of parking spaces marked available at the start of each run.
    pub available_spaces: usize,

    /// Number of parking search vehicles in the demand.
    pub vehicles: usize,

    /// Probability in `[0, 1]` that a vehicle searches cooperatively.
    pub cooperation_ratio: f64,

    /// Base seed.  `Some(s)` makes run `i` use seed `s + i`, so every run is
    /// reproducible on its own.  `None` draws a fresh seed per run.
    pub seed: Option<u64>,

    /// Number of independent runs.
    pub runs: u32,

    /// Hard stop for the stepping loop.  Vehicles still searching when it is
    /// reached are reported as `still_searching`.
    pub max_steps: u64,

    /// Parking-space scan geometry.
    pub scan: ScanParams,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            available_spaces:  10,
            vehicles:          10,
            cooperation_ratio: 0.0,
            seed:              None,
            runs:              1,
            max_steps:         10_000,
            scan:              ScanParams::default(),
        }
    }
}

impl SearchConfig {
    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.cooperation_ratio) {
            return Err(CoreError::Config(format!(
                "cooperation ratio must lie in [0, 1], got {}",
                self.cooperation_ratio
            )));
        }
        if self.runs == 0 {
            return Err(CoreError::Config("number of runs must be at least 1".into()));
        }
        if self.max_steps == 0 {
            return Err(CoreError::Config("max_steps must be at least 1".into()));
        }
        self.scan.validate()
    }

    /// Seed for run `run`, or `None` when runs are not seeded.
    #[inline]
    pub fn run_seed(&self, run: u32) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(run as u64))
    }
}
