use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use autofix_tools::ToolKind;

use crate::{ErrorRecord, FileErrorMap};

/// A banner such as `====== FAILURES ======` opening pytest's failure section
static FAILURE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[=*]{3,}\s*FAILURES\s*[=*]{3,}\s*$").expect("failure marker regex")
});

static FAILED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(FAILED[ \t]+(\S+).*?)[ \t\r]*$").expect("failed line regex")
});

static ASSERTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^E[ \t]+(.+?)[ \t\r]*$").expect("assertion line regex"));

/// `path:line:col: CODE: message`
static LINT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([^:\n]+):(\d+):(\d+): ([A-Z]\d+): (.+?)[ \t\r]*$").expect("lint line regex")
});

/// Turns raw tool output into errors keyed by file
pub trait LogParser: Send + Sync {
    fn parse(&self, raw: &str) -> FileErrorMap;
}

/// A `FAILED <id>` line found inside the failure section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTest {
    /// `tests/test_calculator.py::test_multiply`
    pub id: String,
    /// The whole line, starting at `FAILED`
    pub line: String,
}

/// Parser for pytest-style output
#[derive(Debug, Clone)]
pub struct TestOutputParser {
    path_token: Regex,
}

impl Default for TestOutputParser {
    fn default() -> Self {
        Self::new("py")
    }
}

impl TestOutputParser {
    /// `source_extension` is the extension (without dot) that marks a token
    /// in a failure line as a file path.
    pub fn new(source_extension: &str) -> Self {
        let pattern = format!(
            r"[A-Za-z0-9_/-]+\.{}\b",
            regex::escape(source_extension.trim_start_matches('.'))
        );
        Self {
            path_token: Regex::new(&pattern).expect("escaped extension always forms a valid regex"),
        }
    }

    /// Everything after the first failure-section marker, if there is one
    pub fn failure_section<'a>(&self, raw: &'a str) -> Option<&'a str> {
        FAILURE_MARKER.find(raw).map(|m| &raw[m.end()..])
    }

    pub fn has_failures(&self, raw: &str) -> bool {
        FAILURE_MARKER.is_match(raw)
    }

    /// `FAILED` lines inside the failure section, in output order
    pub fn failed_tests(&self, raw: &str) -> Vec<FailedTest> {
        let Some(section) = self.failure_section(raw) else {
            return Vec::new();
        };
        FAILED_LINE
            .captures_iter(section)
            .map(|caps| FailedTest {
                id: caps[2].to_string(),
                line: caps[1].to_string(),
            })
            .collect()
    }

    /// `E <message>` assertion lines inside the failure section, in output order
    pub fn assertion_details(&self, raw: &str) -> Vec<String> {
        let Some(section) = self.failure_section(raw) else {
            return Vec::new();
        };
        ASSERTION_LINE
            .captures_iter(section)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Distinct path-like tokens in `line`, first occurrence first
    pub fn paths_in(&self, line: &str) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for m in self.path_token.find_iter(line) {
            if !paths.iter().any(|p| p == m.as_str()) {
                paths.push(m.as_str().to_string());
            }
        }
        paths
    }
}

impl LogParser for TestOutputParser {
    fn parse(&self, raw: &str) -> FileErrorMap {
        let mut map = FileErrorMap::new();
        for failed in self.failed_tests(raw) {
            for path in self.paths_in(&failed.line) {
                map.push(ErrorRecord::test_failure(path, &failed.id, &failed.line));
            }
        }
        debug!(files = map.len(), errors = map.total_errors(), "Parsed test output");
        map
    }
}

/// Parser for pylint-style `path:line:col: CODE: message` output
#[derive(Debug, Clone, Default)]
pub struct LintOutputParser;

impl LintOutputParser {
    pub fn new() -> Self {
        Self
    }

    /// Every matching line as a record, in output order
    pub fn records(&self, raw: &str) -> Vec<ErrorRecord> {
        LINT_LINE
            .captures_iter(raw)
            .filter_map(|caps| {
                let line = caps[2].parse::<u32>().ok()?;
                Some(ErrorRecord::lint(caps[1].trim(), &caps[4], line, &caps[5]))
            })
            .collect()
    }
}

impl LogParser for LintOutputParser {
    fn parse(&self, raw: &str) -> FileErrorMap {
        let map: FileErrorMap = self.records(raw).into_iter().collect();
        debug!(files = map.len(), errors = map.total_errors(), "Parsed lint output");
        map
    }
}
