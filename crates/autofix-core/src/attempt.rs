use serde::{Deserialize, Serialize};

/// Result of one repair attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Written, committed, and no errors remain
    Success,
    /// Empty or identical content proposed; nothing written
    NoChange,
    /// Errors remain after the write, or the attempt itself failed
    Failed,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::NoChange => "no_change",
            AttemptOutcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a single attempt at repairing one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixAttempt {
    pub file_path: String,
    /// 1-based
    pub attempt_number: u32,
    #[serde(skip)]
    pub prior_content: String,
    #[serde(skip)]
    pub proposed_content: String,
    pub diff: String,
    /// Id of the commit made for this attempt
    pub commit: Option<String>,
    pub outcome: AttemptOutcome,
    /// Errors still reported for the file after this attempt
    pub remaining_errors: usize,
    pub error: Option<String>,
}

impl FixAttempt {
    pub fn new(file_path: impl Into<String>, attempt_number: u32, prior_content: String) -> Self {
        Self {
            file_path: file_path.into(),
            attempt_number,
            prior_content,
            proposed_content: String::new(),
            diff: String::new(),
            commit: None,
            outcome: AttemptOutcome::Failed,
            remaining_errors: 0,
            error: None,
        }
    }

    pub fn no_change(mut self, proposed_content: String, remaining_errors: usize) -> Self {
        self.proposed_content = proposed_content;
        self.outcome = AttemptOutcome::NoChange;
        self.remaining_errors = remaining_errors;
        self
    }

    pub fn failed_with(mut self, error: String, remaining_errors: usize) -> Self {
        self.outcome = AttemptOutcome::Failed;
        self.error = Some(error);
        self.remaining_errors = remaining_errors;
        self
    }

    pub fn is_committed(&self) -> bool {
        self.commit.is_some()
    }

    /// Lines added and removed in the recorded diff
    pub fn line_counts(&self) -> (usize, usize) {
        let mut insertions = 0;
        let mut deletions = 0;
        for line in self.diff.lines() {
            if line.starts_with("+++") || line.starts_with("---") {
                continue;
            }
            if line.starts_with('+') {
                insertions += 1;
            } else if line.starts_with('-') {
                deletions += 1;
            }
        }
        (insertions, deletions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_counts_skip_headers() {
        let mut attempt = FixAttempt::new("calculator/calculator.py", 1, String::new());
        attempt.diff = "--- a/calculator/calculator.py\n+++ b/calculator/calculator.py\n@@ -1,2 +1,2 @@\n def multiply(a, b):\n-    return a * b + 1\n+    return a * b\n".into();
        assert_eq!(attempt.line_counts(), (1, 1));
    }

    #[test]
    fn test_no_change_attempt() {
        let attempt = FixAttempt::new("a.py", 2, "x".into()).no_change("x".into(), 3);
        assert_eq!(attempt.outcome, AttemptOutcome::NoChange);
        assert_eq!(attempt.remaining_errors, 3);
        assert!(!attempt.is_committed());
        assert_eq!(attempt.outcome.to_string(), "no_change");
    }
}
