//! The `OutputWriter` trait implemented by backend writers.

use crate::{OutcomeRow, OutputResult, StepSummaryRow};

/// Sink for search outcomes and step summaries.
///
/// The observer never surfaces errors during a run; they are stored and
/// retrieved with [`SearchOutputObserver::take_error`][crate::SearchOutputObserver::take_error].
pub trait OutputWriter {
    fn write_outcome(&mut self, row: &OutcomeRow) -> OutputResult<()>;

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()>;

    /// Push buffered rows to disk.  Called at the end of every run.
    fn flush(&mut self) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
