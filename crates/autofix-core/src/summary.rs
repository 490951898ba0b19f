use serde::Serialize;

use autofix_extract::ErrorRecord;

/// Diff sections and verification notes accumulated across every file of a run.
///
/// One change section is kept per written attempt; no-op and failed requests
/// add nothing to it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSummary {
    changes: Vec<String>,
    verification: Vec<String>,
}

impl ChangeSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_change(&mut self, file_path: &str, attempt: u32, diff: &str) {
        self.changes.push(format!(
            "## Changes to {} (Attempt {})\n```diff\n{}\n```",
            file_path, attempt, diff
        ));
    }

    pub fn record_fixed(&mut self, file_path: &str, attempt: u32) {
        self.verification.push(format!(
            "### {} - ✅ Fixed successfully\nNo errors reported after attempt {}.",
            file_path, attempt
        ));
    }

    pub fn record_remaining(&mut self, file_path: &str, attempt: u32, errors: &[ErrorRecord]) {
        let details: Vec<String> = errors.iter().map(ErrorRecord::describe).collect();
        self.verification.push(format!(
            "### {} - ❌ Attempt {} failed\n{}",
            file_path,
            attempt,
            details.join("\n")
        ));
    }

    pub fn record_error(&mut self, file_path: &str, attempt: u32, error: &str) {
        self.verification.push(format!(
            "### {} - ❌ Error in fix attempt {}\n{}",
            file_path, attempt, error
        ));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of change sections
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// The `changes_summary` output value
    pub fn render_changes(&self) -> String {
        self.changes.join("\n\n")
    }

    /// The `verification_results` output value
    pub fn render_verification(&self) -> String {
        self.verification.join("\n\n")
    }
}
