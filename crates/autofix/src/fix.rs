//! `autofix fix`: run the repair loop over every affected file.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{bail, Context, Result};
use tracing::warn;

use autofix_core::{
    ErrorCorrelator, FileReport, GitRecorder, RepairLoop, RepairOutcome, RunReport,
};
use autofix_git::{Committer, DiffCapture};
use autofix_llm::ChatCompletionsClient;
use autofix_logging::{LogEvent, RunWriter};
use autofix_tools::ToolConfig;

use crate::AppContext;

/// Where (and whether) to keep the JSONL run record
pub enum RunLog {
    Enabled(Option<PathBuf>),
    Disabled,
}

pub async fn handle_fix(app: &AppContext, max_attempts: Option<u32>, run_log: RunLog) -> Result<i32> {
    let max_attempts = match max_attempts {
        Some(n) => n,
        None => app.run.max_attempts()?,
    };
    if max_attempts == 0 {
        bail!("--max-attempts must be at least 1");
    }
    let files = app.run.affected_files()?;
    let settings = app.project.model.completion_settings();

    if app.dry_run {
        println!("=== Dry Run ===");
        println!("Working dir: {}", app.working_dir.display());
        println!("Files: {}", files.join(", "));
        println!("Max attempts: {}", max_attempts);
        println!("Model: {} ({})", settings.model, settings.endpoint);
        println!(
            "Commit as: {} <{}>",
            app.run.bot_identity.name, app.run.bot_identity.email
        );
        return Ok(0);
    }

    let client = ChatCompletionsClient::new(app.run.credential.clone(), settings)
        .context("OPENAI_API_KEY is required for fix")?;

    let linter = app.project.tools.linter()?;
    let test_runner = app.project.tools.test_runner()?;
    let correlator = ErrorCorrelator::new(
        &linter,
        &test_runner,
        app.project.layout.test_layout(),
        ToolConfig::new(app.working_dir.clone()),
    );
    let recorder = GitRecorder::new(
        app.working_dir.clone(),
        DiffCapture::new(),
        Committer::new(app.run.bot_identity.clone()),
    );

    let repair = RepairLoop::new(
        &client,
        &correlator,
        &recorder,
        app.logger.clone(),
        max_attempts,
    );

    // Handle Ctrl+C gracefully
    let interrupt_handle = repair.interrupt_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing current attempt...");
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let run_writer = match run_log {
        RunLog::Enabled(dir) => {
            let seed = format!("{}:{}", app.working_dir.display(), files.join(","));
            match RunWriter::new(dir.as_deref(), &seed) {
                Ok(writer) => Some(writer),
                Err(e) => {
                    warn!(error = %e, "Failed to create run record, continuing without it");
                    None
                }
            }
        }
        RunLog::Disabled => None,
    };
    if let Some(writer) = &run_writer {
        writer.write_start(
            "fix",
            &app.working_dir,
            &files,
            max_attempts,
            Some(&app.project.model.model),
        );
    }

    app.logger.log(&LogEvent::RunStarted {
        command: "fix".to_string(),
        working_dir: app.working_dir.clone(),
        files: files.len(),
    });

    let report = repair
        .run(&files)
        .await
        .context("Repair aborted by a configuration error")?;

    if let Some(writer) = &run_writer {
        record_run(writer, &report);
    }

    app.outputs
        .set_output("changes_summary", &report.summary.render_changes())
        .context("Failed to write changes_summary output")?;
    app.outputs
        .set_output("verification_results", &report.summary.render_verification())
        .context("Failed to write verification_results output")?;
    app.outputs
        .set_output("fixed_any", if report.fixed_any() { "true" } else { "false" })
        .context("Failed to write fixed_any output")?;

    if app.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        if let Some(writer) = &run_writer {
            eprintln!("Run record: {}", writer.path().display());
        }
    }

    Ok(report.exit_code())
}

fn record_run(writer: &RunWriter, report: &RunReport) {
    for file in &report.files {
        for attempt in &file.attempts {
            writer.write_attempt(
                &attempt.file_path,
                attempt.attempt_number,
                attempt.outcome.as_str(),
                &attempt.diff,
                attempt.remaining_errors,
                attempt.error.as_deref(),
            );
        }
        writer.write_file_end(&file.file_path, file.outcome.as_str(), file.attempts_made());
    }
    writer.write_end(
        report.fixed_count(),
        report.files.len(),
        report.total_duration_secs,
    );
}

fn print_report(report: &RunReport) {
    eprintln!();
    if report.was_interrupted() {
        eprintln!("=== INTERRUPTED ===");
    } else if report.fixed_any() {
        eprintln!("=== FIXED ===");
    } else {
        eprintln!("=== NO FIXES ===");
    }
    for file in &report.files {
        eprintln!("{}", describe(file));
    }
    eprintln!(
        "Fixed {} of {} file(s), {} commit(s)",
        report.fixed_count(),
        report.files.len(),
        report.files.iter().map(FileReport::commits).sum::<usize>()
    );
    eprintln!("Duration: {:.1}s", report.total_duration_secs);
}

fn describe(file: &FileReport) -> String {
    match &file.outcome {
        RepairOutcome::Succeeded => format!(
            "  {}: fixed after {} attempt(s)",
            file.file_path,
            file.attempts_made()
        ),
        RepairOutcome::Exhausted => format!(
            "  {}: still failing after {} attempt(s)",
            file.file_path,
            file.attempts_made()
        ),
        RepairOutcome::Skipped { reason } => format!("  {}: skipped ({})", file.file_path, reason),
        RepairOutcome::Interrupted => format!(
            "  {}: interrupted after {} attempt(s)",
            file.file_path,
            file.attempts_made()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_outcomes() {
        let skipped = FileReport::skipped("a.py", "no errors found");
        assert_eq!(describe(&skipped), "  a.py: skipped (no errors found)");

        let exhausted = FileReport {
            file_path: "b.py".into(),
            outcome: RepairOutcome::Exhausted,
            attempts: Vec::new(),
        };
        assert_eq!(describe(&exhausted), "  b.py: still failing after 0 attempt(s)");
    }
}
