//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `search_outcomes.csv`
//! - `step_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use log::debug;

use crate::writer::OutputWriter;
use crate::{OutcomeRow, OutputResult, StepSummaryRow};

pub const OUTCOMES_FILE: &str = "search_outcomes.csv";
pub const STEP_SUMMARIES_FILE: &str = "step_summaries.csv";

pub const OUTCOME_HEADER: [&str; 7] =
    ["run", "vehicle", "space", "strategy", "step", "elapsed_steps", "distance_m"];
pub const STEP_SUMMARY_HEADER: [&str; 6] =
    ["run", "step", "searching", "parked", "failed", "removed"];

/// Writes run output to two CSV files.
pub struct CsvWriter {
    outcomes:  Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open (truncating) the two CSV files and write
    /// the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut outcomes = Writer::from_path(dir.join(OUTCOMES_FILE))?;
        outcomes.write_record(OUTCOME_HEADER)?;

        let mut summaries = Writer::from_path(dir.join(STEP_SUMMARIES_FILE))?;
        summaries.write_record(STEP_SUMMARY_HEADER)?;

        debug!("writing CSV output to {}", dir.display());
        Ok(Self { outcomes, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_outcome(&mut self, row: &OutcomeRow) -> OutputResult<()> {
        self.outcomes.write_record(&[
            row.run.to_string(),
            row.vehicle.to_string(),
            row.space.to_string(),
            row.strategy_label().to_owned(),
            row.step.to_string(),
            row.elapsed.to_string(),
            format!("{:.2}", row.distance),
        ])?;
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.run.to_string(),
            row.step.to_string(),
            row.searching.to_string(),
            row.parked.to_string(),
            row.failed.to_string(),
            row.removed.to_string(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.outcomes.flush()?;
        self.summaries.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush()
    }
}
