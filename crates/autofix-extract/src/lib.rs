//! # autofix-extract
//!
//! Turns raw test-runner and linter output into errors grouped by file.
//!
//! ## Key Types
//!
//! - [`ErrorRecord`] - one error attributed to one file
//! - [`FileErrorMap`] - errors keyed by path, in parse order
//! - [`LogParser`] - per-tool parser, implemented by [`TestOutputParser`]
//!   and [`LintOutputParser`]
//! - [`LogExtractor`] - reads collected `*.log` artifacts or runs the tool live
//!
//! ## Output shapes
//!
//! Lint lines look like `calculator/calculator.py:5:0: W0611: Unused import random (unused-import)`.
//! Test failures are only read after a `==== FAILURES ====` banner, from
//! lines such as `FAILED tests/test_calculator.py::test_multiply - assert 7 == 6`.

mod extractor;
mod map;
mod parser;
mod record;

pub use extractor::{ExtractError, Extraction, LogExtractor, LogSource};
pub use map::{FileErrorMap, MergePolicy};
pub use parser::{FailedTest, LintOutputParser, LogParser, TestOutputParser};
pub use record::{ErrorKind, ErrorRecord};
