use serde::Serialize;
use std::time::Duration;

use crate::{ChangeSummary, FixAttempt};

/// Terminal state of one file's repair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// A correlation pass after a write reported no errors
    Succeeded,
    /// The attempt budget ran out with errors still reported
    Exhausted,
    /// Never attempted
    Skipped { reason: String },
    /// User requested stop (e.g., Ctrl+C)
    Interrupted,
}

impl RepairOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairOutcome::Succeeded => "succeeded",
            RepairOutcome::Exhausted => "exhausted",
            RepairOutcome::Skipped { .. } => "skipped",
            RepairOutcome::Interrupted => "interrupted",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RepairOutcome::Succeeded)
    }
}

/// Everything that happened to one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_path: String,
    pub outcome: RepairOutcome,
    pub attempts: Vec<FixAttempt>,
}

impl FileReport {
    pub fn skipped(file_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            outcome: RepairOutcome::Skipped {
                reason: reason.into(),
            },
            attempts: Vec::new(),
        }
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts.len() as u32
    }

    /// Attempts that wrote and committed new content
    pub fn commits(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_committed()).count()
    }
}

/// The result of repairing every requested file
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub files: Vec<FileReport>,
    #[serde(skip)]
    pub summary: ChangeSummary,
    pub total_duration_secs: f64,
    /// Set when a stop was requested, even between files
    pub interrupted: bool,
}

impl RunReport {
    pub fn new(files: Vec<FileReport>, summary: ChangeSummary, duration: Duration) -> Self {
        Self {
            files,
            summary,
            total_duration_secs: duration.as_secs_f64(),
            interrupted: false,
        }
    }

    pub fn with_interrupted(mut self, interrupted: bool) -> Self {
        self.interrupted = interrupted;
        self
    }

    pub fn fixed_count(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_success()).count()
    }

    /// True when any file was repaired
    pub fn fixed_any(&self) -> bool {
        self.fixed_count() > 0
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupted
            || self
                .files
                .iter()
                .any(|f| f.outcome == RepairOutcome::Interrupted)
    }

    pub fn exit_code(&self) -> i32 {
        if self.was_interrupted() {
            130
        } else {
            0
        }
    }
}
