//! # autofix-core
//!
//! The repair pipeline: scope errors to a file, ask for a fix, record it,
//! and check again until the file is clean or the attempt budget is spent.
//!
//! ## Key Types
//!
//! - [`ErrorCorrelator`] - runs the linter and test runner against one file
//! - [`RepairLoop`] - per-file attempt loop
//! - [`ChangeRecorder`] - file writes, diffs and commits ([`GitRecorder`])
//! - [`ChangeSummary`] - diff sections handed to the publish step

mod attempt;
mod correlator;
mod error;
mod loop_runner;
mod outcome;
mod recorder;
mod summary;

pub use attempt::{AttemptOutcome, FixAttempt};
pub use correlator::{Correlate, Correlation, ErrorCorrelator, TestLayout};
pub use error::RepairError;
pub use loop_runner::RepairLoop;
pub use outcome::{FileReport, RepairOutcome, RunReport};
pub use recorder::{ChangeRecorder, GitRecorder};
pub use summary::ChangeSummary;
