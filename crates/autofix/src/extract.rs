//! `autofix extract`: collect errors per file and export them for the fix step.

use anyhow::{Context, Result};
use colored::Colorize;

use autofix_extract::{
    Extraction, FileErrorMap, LintOutputParser, LogExtractor, LogSource, MergePolicy,
    TestOutputParser,
};
use autofix_logging::LogEvent;
use autofix_tools::{Tool, ToolConfig};

use crate::AppContext;

pub async fn handle_extract(app: &AppContext, merge: Option<MergePolicy>) -> Result<i32> {
    let linter = app.project.tools.linter()?;
    let test_runner = app.project.tools.test_runner()?;
    let artifacts = &app.project.artifacts;
    let merge = merge.unwrap_or(app.project.extract.merge);
    let config = ToolConfig::new(app.working_dir.clone());

    if app.dry_run {
        println!("=== Dry Run ===");
        println!("Working dir: {}", app.working_dir.display());
        println!("Lint logs: {}", artifacts.lint_logs.display());
        println!("Test logs: {}", artifacts.test_logs.display());
        println!(
            "Lint fallback: {} ({})",
            app.project.tools.lint_command,
            availability(&linter, &config).await
        );
        println!(
            "Test fallback: {} ({})",
            app.project.tools.test_command,
            availability(&test_runner, &config).await
        );
        println!("Merge policy: {:?}", merge);
        return Ok(0);
    }

    app.logger.log(&LogEvent::RunStarted {
        command: "extract".to_string(),
        working_dir: app.working_dir.clone(),
        files: 0,
    });

    let lint_parser = LintOutputParser::new();
    let lint = LogExtractor::new(&lint_parser, &linter, artifacts.lint_logs.clone())
        .extract(&config)
        .await;
    log_extraction(app, &linter, &lint);

    let test_parser = TestOutputParser::new(&app.project.layout.source_extension);
    let tests = LogExtractor::new(&test_parser, &test_runner, artifacts.test_logs.clone())
        .extract(&config)
        .await;
    log_extraction(app, &test_runner, &tests);

    let mut errors: FileErrorMap = lint.errors;
    errors.merge(tests.errors, merge);

    let report = errors.render_report();
    let files: Vec<&str> = errors.paths().collect();
    let files_json = serde_json::to_string(&files)?;

    app.outputs
        .set_output("error_details", &report)
        .context("Failed to write error_details output")?;
    app.outputs
        .set_env("ERROR_FILES", &files_json)
        .context("Failed to export ERROR_FILES")?;

    if app.json_output {
        println!("{}", serde_json::to_string_pretty(&errors)?);
    } else {
        eprintln!();
        eprintln!(
            "{} Found errors in {} {}.",
            "●".bright_blue(),
            errors.len(),
            if errors.len() == 1 { "file" } else { "files" }
        );
        println!("{}", report);
    }

    Ok(0)
}

async fn availability(tool: &dyn Tool, config: &ToolConfig) -> &'static str {
    if tool.is_available(config).await {
        "available"
    } else {
        "not found"
    }
}

fn log_extraction(app: &AppContext, tool: &dyn Tool, extraction: &Extraction) {
    let source = match &extraction.source {
        LogSource::Artifacts { files } => format!("{} log artifacts", files),
        LogSource::LiveRun { exit_code } => format!("live run, exit {}", exit_code),
        LogSource::Unavailable { reason } => {
            app.logger.log(&LogEvent::ToolFailed {
                tool: tool.name().to_string(),
                error: reason.clone(),
            });
            "unavailable".to_string()
        }
    };
    app.logger.log(&LogEvent::ExtractionCompleted {
        tool: tool.kind().to_string(),
        source,
        files: extraction.errors.len(),
        errors: extraction.errors.total_errors(),
    });
}
