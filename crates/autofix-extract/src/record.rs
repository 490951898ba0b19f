use serde::{Deserialize, Serialize};

/// What produced an error record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A `path:line:col:code: message` line from the linter
    LintError,
    /// A `FAILED <test id>` line from the test runner
    TestFailure,
    /// An `E <message>` assertion-detail line, attached for context only
    AssertionDetail,
}

/// One error attributed to one file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    file_path: String,
    kind: ErrorKind,
    code: Option<String>,
    line: Option<u32>,
    message: String,
}

impl ErrorRecord {
    pub fn lint(
        file_path: impl Into<String>,
        code: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            kind: ErrorKind::LintError,
            code: Some(code.into()),
            line: Some(line),
            message: message.into(),
        }
    }

    /// `test_id` is the identifier after `FAILED`; `failed_line` is the whole line.
    pub fn test_failure(
        file_path: impl Into<String>,
        test_id: impl Into<String>,
        failed_line: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            kind: ErrorKind::TestFailure,
            code: Some(test_id.into()),
            line: None,
            message: failed_line.into(),
        }
    }

    pub fn assertion_detail(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            kind: ErrorKind::AssertionDetail,
            code: None,
            line: None,
            message: message.into(),
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Lint code (`W0611`) or test identifier (`tests/test_x.py::test_y`)
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_test_failure(&self) -> bool {
        self.kind == ErrorKind::TestFailure
    }

    /// Human-readable one-line description, as shown in reports and prompts
    pub fn describe(&self) -> String {
        match self.kind {
            ErrorKind::LintError => format!(
                "Lint error {} at {}:{}: {}",
                self.code.as_deref().unwrap_or("?"),
                self.file_path,
                self.line.map(|l| l.to_string()).unwrap_or_else(|| "?".into()),
                self.message
            ),
            ErrorKind::TestFailure => format!("Test failure: {}", self.message),
            ErrorKind::AssertionDetail => format!("Error message: {}", self.message),
        }
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lint() {
        let record = ErrorRecord::lint(
            "calculator/calculator.py",
            "W0611",
            5,
            "Unused import random (unused-import)",
        );
        assert_eq!(
            record.describe(),
            "Lint error W0611 at calculator/calculator.py:5: Unused import random (unused-import)"
        );
    }

    #[test]
    fn test_describe_test_failure() {
        let record = ErrorRecord::test_failure(
            "tests/test_calculator.py",
            "tests/test_calculator.py::test_multiply",
            "FAILED tests/test_calculator.py::test_multiply - assert 7 == 6",
        );
        assert!(record.is_test_failure());
        assert_eq!(record.code(), Some("tests/test_calculator.py::test_multiply"));
        assert_eq!(
            record.to_string(),
            "Test failure: FAILED tests/test_calculator.py::test_multiply - assert 7 == 6"
        );
    }
}
