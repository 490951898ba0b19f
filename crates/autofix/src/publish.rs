//! `autofix publish`: hand the fix commits off as a draft pull request.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use autofix_git::{create_branch_and_checkout, GitStatus};
use autofix_tools::{ProcessSpawner, ToolConfig, ToolOutput};

use crate::AppContext;

pub const PR_TITLE: &str = "🤖 Auto-fix for failing CI";
pub const PR_LABEL: &str = "ci-fix";

/// A pull request ready to be opened with `gh`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub title: String,
    pub body: String,
    pub branch: String,
    pub base: String,
}

impl PullRequest {
    pub fn new(run_id: &str, base: &str, error_report: &str, changes: &str) -> Self {
        Self {
            title: PR_TITLE.to_string(),
            body: build_body(error_report, changes),
            branch: branch_name(run_id),
            base: base.to_string(),
        }
    }

    /// Arguments for `gh`
    pub fn gh_args(&self) -> Vec<String> {
        [
            "pr",
            "create",
            "--title",
            self.title.as_str(),
            "--body",
            self.body.as_str(),
            "--head",
            self.branch.as_str(),
            "--base",
            self.base.as_str(),
            "--label",
            PR_LABEL,
            "--draft",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

pub fn branch_name(run_id: &str) -> String {
    format!("ci-fix-auto-{}", run_id)
}

pub fn build_body(error_report: &str, changes: &str) -> String {
    let mut body = String::from("## Automated Fixes for CI Failures\n\n");
    if !error_report.trim().is_empty() {
        body.push_str("### Detected Errors\n```\n");
        body.push_str(error_report.trim_end());
        body.push_str("\n```\n\n");
    }
    body.push_str("### Changes\n");
    body.push_str(changes.trim_end());
    body.push_str("\n\n**Fixes generated automatically based on CI/CD logs. Please review before merging.**");
    body
}

pub async fn handle_publish(
    app: &AppContext,
    summary_file: Option<PathBuf>,
    errors_file: Option<PathBuf>,
    base: &str,
) -> Result<i32> {
    let changes = match summary_file {
        Some(path) => read_optional(&app.working_dir, Some(&path))?,
        None => app.run.changes_summary.clone().unwrap_or_default(),
    };
    if changes.trim().is_empty() {
        eprintln!("{} No changes detected. Exiting without creating a PR.", "●".dimmed());
        return Ok(0);
    }
    let error_report = match errors_file {
        Some(path) => read_optional(&app.working_dir, Some(&path))?,
        None => app.run.error_details.clone().unwrap_or_default(),
    };
    let pr = PullRequest::new(&app.run.run_id, base, &error_report, &changes);

    if app.dry_run {
        println!("=== Dry Run ===");
        println!("Branch: {} -> {}", pr.branch, pr.base);
        println!("Title: {}", pr.title);
        println!("{}", pr.body);
        return Ok(0);
    }

    match GitStatus::capture(&app.working_dir) {
        Ok(status) if !status.is_clean() => warn!(
            changes = status.total_changes(),
            "Working tree has uncommitted changes; only committed fixes are published"
        ),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Could not read git status"),
    }

    create_branch_and_checkout(&app.working_dir, &pr.branch)
        .with_context(|| format!("Failed to create branch {}", pr.branch))?;

    let config = ToolConfig::new(app.working_dir.clone());
    run_checked(Path::new("git"), &["push", "origin", pr.branch.as_str()], &config)
        .await
        .context("Failed to push fix branch")?;

    let args = pr.gh_args();
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let output = run_checked(Path::new("gh"), &arg_refs, &config)
        .await
        .context("Failed to create pull request")?;

    info!(branch = %pr.branch, "Pull request created");
    if app.json_output {
        println!(
            "{}",
            serde_json::json!({
                "branch": pr.branch,
                "base": pr.base,
                "url": output.stdout.trim(),
            })
        );
    } else {
        eprintln!("{} {}", "✓".bright_green(), output.stdout.trim());
    }
    Ok(0)
}

async fn run_checked(program: &Path, args: &[&str], config: &ToolConfig) -> Result<ToolOutput> {
    let output = ProcessSpawner::spawn(program, args, config)
        .await
        .with_context(|| format!("Failed to run {}", program.display()))?;
    if !output.success() {
        bail!(
            "{} exited with {}: {}",
            program.display(),
            output.exit_code,
            output.stderr.trim()
        );
    }
    Ok(output)
}

fn read_optional(working_dir: &Path, path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(String::new());
    };
    let path = working_dir.join(path);
    if !path.exists() {
        return Ok(String::new());
    }
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}
