//! `ps-output` — run output writers for the parking search workspace.
//!
//! | Backend | Files created                                 |
//! |---------|-----------------------------------------------|
//! | CSV     | `search_outcomes.csv`, `step_summaries.csv`   |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SearchOutputObserver`], which implements `ps_sim::SearchObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ps_output::{CsvWriter, SearchOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SearchOutputObserver::new(writer);
//! for run in 0..config.runs {
//!     obs.set_run(run);
//!     Runner::new(session, engine).run(&mut obs)?;
//! }
//! obs.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SearchOutputObserver;
pub use row::{OutcomeRow, StepSummaryRow};
pub use writer::OutputWriter;
