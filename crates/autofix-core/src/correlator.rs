use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use autofix_extract::{ErrorRecord, LintOutputParser, TestOutputParser};
use autofix_tools::{Tool, ToolConfig, ToolError};

/// Most assertion-detail lines attached to one file
const MAX_ASSERTION_DETAILS: usize = 5;

/// Where tests live and how they are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLayout {
    pub tests_dir: PathBuf,
    pub test_prefix: String,
    pub source_extension: String,
}

impl Default for TestLayout {
    fn default() -> Self {
        Self {
            tests_dir: PathBuf::from("tests"),
            test_prefix: "test_".to_string(),
            source_extension: "py".to_string(),
        }
    }
}

impl TestLayout {
    /// A test file carries the test prefix in its name or sits under the tests directory.
    pub fn is_test_file(&self, path: &Path) -> bool {
        let named_like_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(&self.test_prefix));
        named_like_test
            || path
                .ancestors()
                .skip(1)
                .any(|dir| !dir.as_os_str().is_empty() && dir.ends_with(&self.tests_dir))
    }

    /// The test file derived from a source module, e.g. `tests/test_calculator.py`
    pub fn derived_test_file(&self, source: &Path) -> Option<PathBuf> {
        let stem = source.file_stem()?.to_str()?;
        Some(self.tests_dir.join(format!(
            "{}{}.{}",
            self.test_prefix, stem, self.source_extension
        )))
    }

    /// What to run the test runner against for `path`
    pub fn test_target(&self, working_dir: &Path, path: &Path) -> PathBuf {
        if self.is_test_file(path) {
            return path.to_path_buf();
        }
        match self.derived_test_file(path) {
            Some(candidate) if working_dir.join(&candidate).exists() => candidate,
            _ => self.tests_dir.clone(),
        }
    }
}

/// Errors found for one file, with each source reported separately so callers
/// can tell "no errors" from "could not check".
#[derive(Debug)]
pub struct Correlation {
    pub lint: Result<Vec<ErrorRecord>, ToolError>,
    pub tests: Result<Vec<ErrorRecord>, ToolError>,
}

impl Correlation {
    pub fn clean() -> Self {
        Self {
            lint: Ok(Vec::new()),
            tests: Ok(Vec::new()),
        }
    }

    pub fn from_errors(lint: Vec<ErrorRecord>, tests: Vec<ErrorRecord>) -> Self {
        Self {
            lint: Ok(lint),
            tests: Ok(tests),
        }
    }

    /// True when at least one source could not be checked
    pub fn is_degraded(&self) -> bool {
        self.lint.is_err() || self.tests.is_err()
    }

    /// Lint records then test records. A source that failed contributes nothing.
    pub fn into_errors(self) -> Vec<ErrorRecord> {
        let mut errors = self.lint.unwrap_or_default();
        errors.extend(self.tests.unwrap_or_default());
        errors
    }
}

/// Re-scopes the tools to a single file and reports the errors that apply to it
#[async_trait]
pub trait Correlate: Send + Sync {
    async fn correlate(&self, path: &str) -> Correlation;
}

/// [`Correlate`] backed by a linter and a test runner
pub struct ErrorCorrelator<'a> {
    linter: &'a dyn Tool,
    test_runner: &'a dyn Tool,
    layout: TestLayout,
    config: ToolConfig,
    test_parser: TestOutputParser,
    lint_parser: LintOutputParser,
}

impl<'a> ErrorCorrelator<'a> {
    pub fn new(
        linter: &'a dyn Tool,
        test_runner: &'a dyn Tool,
        layout: TestLayout,
        config: ToolConfig,
    ) -> Self {
        let test_parser = TestOutputParser::new(&layout.source_extension);
        Self {
            linter,
            test_runner,
            layout,
            config,
            test_parser,
            lint_parser: LintOutputParser::new(),
        }
    }

    /// Lint `path` alone. The path column of each line is replaced by `path`.
    pub async fn lint_errors(&self, path: &str) -> Result<Vec<ErrorRecord>, ToolError> {
        let output = self
            .linter
            .run_on(&[Path::new(path)], &self.config)
            .await?;

        let errors: Vec<ErrorRecord> = self
            .lint_parser
            .records(&output.combined_output())
            .into_iter()
            .map(|r| {
                ErrorRecord::lint(
                    path,
                    r.code().unwrap_or_default(),
                    r.line().unwrap_or_default(),
                    r.message(),
                )
            })
            .collect();

        debug!(path, errors = errors.len(), "Lint pass");
        Ok(errors)
    }

    /// Run the tests that cover `path` and keep the failures that mention it
    pub async fn test_errors(&self, path: &str) -> Result<Vec<ErrorRecord>, ToolError> {
        let file = Path::new(path);
        let is_test_file = self.layout.is_test_file(file);
        let target = self.layout.test_target(&self.config.working_dir, file);

        let output = self
            .test_runner
            .run_on(&[target.as_path()], &self.config)
            .await?;
        let raw = output.combined_output();

        if !self.test_parser.has_failures(&raw) {
            debug!(path, target = %target.display(), "Test pass found no failure section");
            return Ok(Vec::new());
        }

        let module = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let mut errors: Vec<ErrorRecord> = self
            .test_parser
            .failed_tests(&raw)
            .into_iter()
            .filter(|failed| is_test_file || (!module.is_empty() && failed.line.contains(module)))
            .map(|failed| ErrorRecord::test_failure(path, failed.id, failed.line))
            .collect();

        // Assertion context is only attached once a failure is tied to this file
        if !errors.is_empty() {
            errors.extend(
                self.test_parser
                    .assertion_details(&raw)
                    .into_iter()
                    .take(MAX_ASSERTION_DETAILS)
                    .map(|msg| ErrorRecord::assertion_detail(path, msg)),
            );
        }

        debug!(path, target = %target.display(), errors = errors.len(), "Test pass");
        Ok(errors)
    }
}

#[async_trait]
impl Correlate for ErrorCorrelator<'_> {
    async fn correlate(&self, path: &str) -> Correlation {
        let lint = self.lint_errors(path).await;
        if let Err(e) = &lint {
            warn!(path, tool = self.linter.name(), error = %e, "Lint pass failed, treating as no lint errors");
        }

        let tests = self.test_errors(path).await;
        if let Err(e) = &tests {
            warn!(path, tool = self.test_runner.name(), error = %e, "Test pass failed, treating as no test errors");
        }

        Correlation { lint, tests }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_test_file() {
        let layout = TestLayout::default();
        assert!(layout.is_test_file(Path::new("tests/test_calculator.py")));
        assert!(layout.is_test_file(Path::new("tests/conftest.py")));
        assert!(layout.is_test_file(Path::new("pkg/tests/helpers.py")));
        assert!(layout.is_test_file(Path::new("test_main.py")));
        assert!(!layout.is_test_file(Path::new("calculator/calculator.py")));
        assert!(!layout.is_test_file(Path::new("tests.py")));
    }

    #[test]
    fn test_derived_test_file() {
        let layout = TestLayout::default();
        assert_eq!(
            layout.derived_test_file(Path::new("calculator/calculator.py")),
            Some(PathBuf::from("tests/test_calculator.py"))
        );
    }

    #[test]
    fn test_target_falls_back_to_tests_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = TestLayout::default();
        assert_eq!(
            layout.test_target(dir.path(), Path::new("calculator/calculator.py")),
            PathBuf::from("tests")
        );

        std::fs::create_dir_all(dir.path().join("tests")).unwrap();
        std::fs::write(dir.path().join("tests/test_calculator.py"), "").unwrap();
        assert_eq!(
            layout.test_target(dir.path(), Path::new("calculator/calculator.py")),
            PathBuf::from("tests/test_calculator.py")
        );
        assert_eq!(
            layout.test_target(dir.path(), Path::new("tests/test_other.py")),
            PathBuf::from("tests/test_other.py")
        );
    }

    #[test]
    fn test_degraded_correlation_contributes_nothing() {
        let correlation = Correlation {
            lint: Err(ToolError::NotFound("pylint".into())),
            tests: Ok(vec![ErrorRecord::assertion_detail("a.py", "assert 7 == 6")]),
        };
        assert!(correlation.is_degraded());
        assert_eq!(correlation.into_errors().len(), 1);
        assert!(!Correlation::clean().is_degraded());
    }
}
