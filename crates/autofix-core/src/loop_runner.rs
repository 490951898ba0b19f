use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use autofix_extract::ErrorRecord;
use autofix_llm::{FileType, FixRequest, FixRequester};
use autofix_logging::{LogEvent, Logger};

use crate::attempt::{AttemptOutcome, FixAttempt};
use crate::correlator::Correlate;
use crate::error::RepairError;
use crate::outcome::{FileReport, RepairOutcome, RunReport};
use crate::recorder::ChangeRecorder;
use crate::ChangeSummary;

/// Drives each file through `Pending -> Attempting(n) -> {Succeeded, Exhausted}`
pub struct RepairLoop<'a> {
    requester: &'a dyn FixRequester,
    correlator: &'a dyn Correlate,
    recorder: &'a dyn ChangeRecorder,
    logger: Arc<Logger>,
    max_attempts: u32,
    interrupted: Arc<AtomicBool>,
}

/// Mutable state of one file between attempts
struct FileState {
    content: String,
    errors: Vec<ErrorRecord>,
}

impl<'a> RepairLoop<'a> {
    pub fn new(
        requester: &'a dyn FixRequester,
        correlator: &'a dyn Correlate,
        recorder: &'a dyn ChangeRecorder,
        logger: Arc<Logger>,
        max_attempts: u32,
    ) -> Self {
        Self {
            requester,
            correlator,
            recorder,
            logger,
            max_attempts,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Repair `files` one after another. Only a fatal error (missing
    /// credential) is returned as `Err`; every per-file failure is in the report.
    pub async fn run(&self, files: &[String]) -> Result<RunReport, RepairError> {
        let started = Instant::now();
        let mut summary = ChangeSummary::new();
        let mut reports = Vec::with_capacity(files.len());

        for file in files {
            if self.is_interrupted() {
                info!("Run interrupted by user, remaining files not started");
                break;
            }
            let report = self.repair_file(file, &mut summary).await?;
            reports.push(report);
        }

        let report = RunReport::new(reports, summary, started.elapsed())
            .with_interrupted(self.is_interrupted());
        self.logger.log(&LogEvent::RunCompleted {
            fixed: report.fixed_count(),
            files: report.files.len(),
            duration_secs: report.total_duration_secs,
        });
        Ok(report)
    }

    /// Repair a single file, appending written diffs to `summary`
    pub async fn repair_file(
        &self,
        path: &str,
        summary: &mut ChangeSummary,
    ) -> Result<FileReport, RepairError> {
        if !self.recorder.exists(path) {
            return Ok(self.skip(path, "file not found"));
        }

        let content = match self.recorder.read(path) {
            Ok(content) => content,
            Err(e) => return Ok(self.skip(path, &e.to_string())),
        };

        let errors = self.correlate(path).await;
        if errors.is_empty() {
            return Ok(self.skip(path, "no errors found"));
        }

        self.logger.log(&LogEvent::RepairStarted {
            file: path.to_string(),
            errors: errors.len(),
            max_attempts: self.max_attempts,
        });

        let file_type = FileType::from_path(path);
        let mut state = FileState { content, errors };
        let mut attempts = Vec::new();

        for n in 1..=self.max_attempts {
            if self.is_interrupted() {
                self.logger.log(&LogEvent::RepairInterrupted {
                    file: path.to_string(),
                    attempt: n,
                });
                return Ok(FileReport {
                    file_path: path.to_string(),
                    outcome: RepairOutcome::Interrupted,
                    attempts,
                });
            }

            self.logger.log(&LogEvent::AttemptStarted {
                file: path.to_string(),
                attempt: n,
                errors: state.errors.len(),
            });

            let attempt = match self.attempt(path, n, file_type, &mut state, summary).await {
                Ok(attempt) => attempt,
                Err(e) if e.is_fatal() => {
                    self.logger.log(&LogEvent::ErrorEncountered {
                        error: e.to_string(),
                    });
                    return Err(e);
                }
                Err(e) => {
                    warn!(path, attempt = n, error = %e, "Fix attempt failed");
                    self.logger.log(&LogEvent::AttemptFailed {
                        file: path.to_string(),
                        attempt: n,
                        error: e.to_string(),
                    });
                    summary.record_error(path, n, &e.to_string());
                    FixAttempt::new(path, n, state.content.clone())
                        .failed_with(e.to_string(), state.errors.len())
                }
            };

            let succeeded = attempt.outcome == AttemptOutcome::Success;
            attempts.push(attempt);

            if succeeded {
                self.logger.log(&LogEvent::FileRepaired {
                    file: path.to_string(),
                    attempts: n,
                });
                return Ok(FileReport {
                    file_path: path.to_string(),
                    outcome: RepairOutcome::Succeeded,
                    attempts,
                });
            }
        }

        if self.is_interrupted() {
            self.logger.log(&LogEvent::RepairInterrupted {
                file: path.to_string(),
                attempt: self.max_attempts,
            });
            return Ok(FileReport {
                file_path: path.to_string(),
                outcome: RepairOutcome::Interrupted,
                attempts,
            });
        }

        self.logger.log(&LogEvent::FileExhausted {
            file: path.to_string(),
            attempts: self.max_attempts,
        });
        Ok(FileReport {
            file_path: path.to_string(),
            outcome: RepairOutcome::Exhausted,
            attempts,
        })
    }

    /// One request / write / diff / commit / re-check cycle
    async fn attempt(
        &self,
        path: &str,
        n: u32,
        file_type: FileType,
        state: &mut FileState,
        summary: &mut ChangeSummary,
    ) -> Result<FixAttempt, RepairError> {
        let record = FixAttempt::new(path, n, state.content.clone());

        let proposed = self
            .requester
            .request_fix(FixRequest {
                file_path: path,
                content: &state.content,
                errors: &state.errors,
                file_type,
                attempt: n,
            })
            .await?;

        if proposed.is_empty() || proposed == state.content {
            debug!(path, attempt = n, "No change proposed");
            self.logger.log(&LogEvent::AttemptNoChange {
                file: path.to_string(),
                attempt: n,
            });
            return Ok(record.no_change(proposed, state.errors.len()));
        }

        self.recorder.write(path, &proposed)?;
        let mut record = FixAttempt {
            proposed_content: proposed.clone(),
            ..record
        };
        state.content = proposed;

        record.diff = self.recorder.diff(path)?;
        summary.record_change(path, n, &record.diff);

        let message = format!("fix: Auto-fix attempt {} for {}", n, path);
        let commit = self.recorder.commit(path, &message)?;
        let (insertions, deletions) = record.line_counts();
        self.logger.log(&LogEvent::AttemptCommitted {
            file: path.to_string(),
            attempt: n,
            commit: commit.clone(),
            insertions,
            deletions,
        });
        record.commit = Some(commit);

        let remaining = self.correlate(path).await;
        if remaining.is_empty() {
            summary.record_fixed(path, n);
            record.outcome = AttemptOutcome::Success;
            record.remaining_errors = 0;
            return Ok(record);
        }

        self.logger.log(&LogEvent::ErrorsRemaining {
            file: path.to_string(),
            attempt: n,
            errors: remaining.len(),
        });
        summary.record_remaining(path, n, &remaining);
        record.outcome = AttemptOutcome::Failed;
        record.remaining_errors = remaining.len();
        state.errors = remaining;
        Ok(record)
    }

    /// A degraded correlation counts as "no errors" from the failed source.
    async fn correlate(&self, path: &str) -> Vec<ErrorRecord> {
        let correlation = self.correlator.correlate(path).await;
        if correlation.is_degraded() {
            if let Err(e) = &correlation.lint {
                self.logger.log(&LogEvent::ToolFailed {
                    tool: "lint".to_string(),
                    error: e.to_string(),
                });
            }
            if let Err(e) = &correlation.tests {
                self.logger.log(&LogEvent::ToolFailed {
                    tool: "tests".to_string(),
                    error: e.to_string(),
                });
            }
        }
        correlation.into_errors()
    }

    fn skip(&self, path: &str, reason: &str) -> FileReport {
        info!(path, reason, "Skipping file");
        self.logger.log(&LogEvent::FileSkipped {
            file: path.to_string(),
            reason: reason.to_string(),
        });
        FileReport::skipped(path, reason)
    }
}
