use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{ProcessSpawner, Tool, ToolConfig, ToolError, ToolKind, ToolOutput};

/// A tool invoked as `program args... targets...`
#[derive(Debug, Clone)]
pub struct CommandTool {
    name: String,
    kind: ToolKind,
    program: PathBuf,
    args: Vec<String>,
    default_targets: Vec<String>,
}

impl CommandTool {
    pub fn new(name: impl Into<String>, kind: ToolKind, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            program: program.into(),
            args: Vec::new(),
            default_targets: Vec::new(),
        }
    }

    /// Build a tool from a whitespace-separated command line such as
    /// `"python -m pytest -v"`. The first word is the program.
    pub fn from_command_line(kind: ToolKind, command_line: &str) -> Result<Self, ToolError> {
        let mut words = command_line.split_whitespace();
        let program = words.next().ok_or_else(|| {
            ToolError::ConfigError(format!("empty {} command", kind))
        })?;
        let name = Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.to_string());
        // `python -m pytest` is named after the module
        let args: Vec<String> = words.map(String::from).collect();
        let name = match args.iter().position(|a| a == "-m") {
            Some(i) if i + 1 < args.len() => args[i + 1].clone(),
            _ => name,
        };
        Ok(Self::new(name, kind, program).with_args(args))
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for a run over `targets`
    pub fn command_args(&self, targets: &[&Path]) -> Vec<String> {
        let mut args = self.args.clone();
        if targets.is_empty() {
            args.extend(self.default_targets.iter().cloned());
        } else {
            args.extend(targets.iter().map(|t| t.display().to_string()));
        }
        args
    }
}

#[async_trait]
impl Tool for CommandTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ToolKind {
        self.kind
    }

    async fn run_on(
        &self,
        targets: &[&Path],
        config: &ToolConfig,
    ) -> Result<ToolOutput, ToolError> {
        let args = self.command_args(targets);
        debug!(tool = %self.name, targets = targets.len(), "Running tool");
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        ProcessSpawner::spawn(&self.program, &arg_refs, config).await
    }

    async fn is_available(&self, config: &ToolConfig) -> bool {
        ProcessSpawner::spawn(&self.program, &["--version"], config)
            .await
            .map(|o| o.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pytest_args_scoped_to_target() {
        let tool = CommandTool::from_command_line(ToolKind::TestRunner, "python -m pytest -v")
            .unwrap();
        let args = tool.command_args(&[Path::new("tests/test_calculator.py")]);
        assert_eq!(args, vec!["-m", "pytest", "-v", "tests/test_calculator.py"]);
        assert_eq!(tool.program(), Path::new("python"));
        assert_eq!(tool.kind(), ToolKind::TestRunner);
    }

    #[test]
    fn test_pylint_uses_default_targets() {
        let tool = CommandTool::from_command_line(
            ToolKind::Linter,
            "pylint --exit-zero --output-format=text",
        )
        .unwrap()
        .with_default_targets(["calculator/", "tests/"]);
        let args = tool.command_args(&[]);
        assert_eq!(
            args,
            vec!["--exit-zero", "--output-format=text", "calculator/", "tests/"]
        );
    }

    #[test]
    fn test_from_command_line_names_python_modules() {
        let tool = CommandTool::from_command_line(ToolKind::TestRunner, "python -m pytest -v")
            .unwrap();
        assert_eq!(tool.name(), "pytest");
        assert_eq!(tool.program(), Path::new("python"));

        let tool = CommandTool::from_command_line(ToolKind::Linter, "/usr/bin/ruff check").unwrap();
        assert_eq!(tool.name(), "ruff");
    }

    #[test]
    fn test_from_command_line_rejects_empty() {
        let result = CommandTool::from_command_line(ToolKind::Linter, "   ");
        assert!(matches!(result, Err(ToolError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_missing_program_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let tool = CommandTool::new("ghost", ToolKind::Linter, "autofix-no-such-binary");
        let result = tool.run(&ToolConfig::new(dir.path().to_path_buf())).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
        assert!(!tool.is_available(&ToolConfig::new(dir.path().to_path_buf())).await);
    }
}
