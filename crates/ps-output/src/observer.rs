//! `SearchOutputObserver<W>` — bridges `SearchObserver` to an `OutputWriter`.

use ps_core::{Step, VehicleId};
use ps_search::{SearchFailure, SearchOutcome};
use ps_sim::{RunSummary, SearchObserver};

use crate::row::{OutcomeRow, StepSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SearchObserver`] that writes every parked vehicle and a per-step
/// summary to an [`OutputWriter`].
///
/// `SearchObserver` methods return nothing, so writer errors are stored and
/// the first one is kept.  Check with [`take_error`][Self::take_error] after
/// a run, or call [`finish`][Self::finish] at the end of the batch.
pub struct SearchOutputObserver<W: OutputWriter> {
    writer:     W,
    run:        u32,
    parked:     u64,
    failed:     u64,
    removed:    u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SearchOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            run:        0,
            parked:     0,
            failed:     0,
            removed:    0,
            last_error: None,
        }
    }

    /// Tag subsequent rows with `run` and reset the step counters.
    pub fn set_run(&mut self, run: u32) {
        self.run = run;
        self.parked = 0;
        self.failed = 0;
        self.removed = 0;
    }

    pub fn run(&self) -> u32 {
        self.run
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Close the writer and report the first error seen during the batch.
    pub fn finish(mut self) -> OutputResult<W> {
        let result = self.writer.finish();
        self.store_err(result);
        match self.last_error.take() {
            Some(e) => Err(e),
            None => Ok(self.writer),
        }
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SearchObserver for SearchOutputObserver<W> {
    fn on_step_end(&mut self, step: Step, searching: usize) {
        let row = StepSummaryRow {
            run:       self.run,
            step:      step.0,
            searching: searching as u64,
            parked:    self.parked,
            failed:    self.failed,
            removed:   self.removed,
        };
        let result = self.writer.write_step_summary(&row);
        self.store_err(result);
    }

    fn on_parked(&mut self, outcome: &SearchOutcome) {
        self.parked += 1;
        let result = self.writer.write_outcome(&OutcomeRow::from_outcome(self.run, outcome));
        self.store_err(result);
    }

    fn on_failure(&mut self, _vehicle: VehicleId, _failure: SearchFailure, _step: Step) {
        self.failed += 1;
    }

    fn on_removed(&mut self, _vehicle: VehicleId, _step: Step) {
        self.removed += 1;
    }

    fn on_run_end(&mut self, _summary: &RunSummary) {
        let result = self.writer.flush();
        self.store_err(result);
    }
}
