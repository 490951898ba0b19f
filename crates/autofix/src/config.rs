//! Configuration for autofix.
//!
//! Project settings come from `autofix.toml` in the working directory.
//! Per-run inputs (credential, attempt budget, affected files, bot identity,
//! output files) come from the CI environment and are read once, here.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use autofix_core::TestLayout;
use autofix_extract::MergePolicy;
use autofix_git::BotIdentity;
use autofix_llm::{CompletionSettings, DEFAULT_MODEL, OPENAI_CHAT_URL};
use autofix_tools::{CommandTool, ToolKind};

/// The config file name
pub const CONFIG_FILE_NAME: &str = "autofix.toml";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Files tried when `ERROR_FILES` is not set
pub const FALLBACK_FILES: [&str; 2] = ["calculator/calculator.py", "tests/test_calculator.py"];

/// Project-level configuration loaded from `autofix.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Test runner and linter command lines
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub test_command: String,
    pub lint_command: String,
    /// What the linter checks when not scoped to a file
    pub lint_targets: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            test_command: "python -m pytest -v".to_string(),
            lint_command: "pylint --exit-zero --output-format=text".to_string(),
            lint_targets: vec!["calculator/".to_string(), "tests/".to_string()],
        }
    }
}

impl ToolsConfig {
    pub fn test_runner(&self) -> Result<CommandTool> {
        CommandTool::from_command_line(ToolKind::TestRunner, &self.test_command)
            .context("Invalid [tools].test_command")
    }

    pub fn linter(&self) -> Result<CommandTool> {
        Ok(
            CommandTool::from_command_line(ToolKind::Linter, &self.lint_command)
                .context("Invalid [tools].lint_command")?
                .with_default_targets(self.lint_targets.iter().cloned()),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub tests_dir: PathBuf,
    pub test_prefix: String,
    pub source_extension: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let layout = TestLayout::default();
        Self {
            tests_dir: layout.tests_dir,
            test_prefix: layout.test_prefix,
            source_extension: layout.source_extension,
        }
    }
}

impl LayoutConfig {
    pub fn test_layout(&self) -> TestLayout {
        TestLayout {
            tests_dir: self.tests_dir.clone(),
            test_prefix: self.test_prefix.clone(),
            source_extension: self.source_extension.clone(),
        }
    }
}

/// Directories holding pre-collected `*.log` files
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactsConfig {
    pub test_logs: PathBuf,
    pub lint_logs: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            test_logs: PathBuf::from("artifacts/test-logs"),
            lint_logs: PathBuf::from("artifacts/lint-logs"),
        }
    }
}

/// Completion service settings
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: OPENAI_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 4096,
        }
    }
}

impl ModelConfig {
    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// How lint and test results for the same file are combined
    pub merge: MergePolicy,
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }
}

/// Inputs for one run, read from the environment at startup.
///
/// `MAX_ATTEMPTS` and `ERROR_FILES` are kept raw and only parsed by
/// [`RunConfig::max_attempts`] / [`RunConfig::affected_files`], so commands
/// that never use them are not broken by a malformed value.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credential: Option<String>,
    max_attempts_raw: Option<String>,
    error_files_raw: Option<String>,
    pub bot_identity: BotIdentity,
    pub output_file: PathBuf,
    pub env_file: PathBuf,
    pub run_id: String,
    /// `changes_summary` of the fix step, handed to publish
    pub changes_summary: Option<String>,
    /// `error_details` of the extract step, handed to publish
    pub error_details: Option<String>,
}

impl RunConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_identity = BotIdentity::from_actor(
            get("GITHUB_ACTOR")
                .as_deref()
                .unwrap_or("ci-bot"),
        );

        Ok(Self {
            credential: get("OPENAI_API_KEY"),
            max_attempts_raw: get("MAX_ATTEMPTS"),
            error_files_raw: get("ERROR_FILES"),
            bot_identity,
            output_file: get("GITHUB_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output.txt")),
            env_file: get("GITHUB_ENV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("env.txt")),
            run_id: get("GITHUB_RUN_ID").unwrap_or_else(|| "1".to_string()),
            changes_summary: get("CHANGES_SUMMARY"),
            error_details: get("ERROR_DETAILS"),
        })
    }

    /// `MAX_ATTEMPTS`, default 3
    pub fn max_attempts(&self) -> Result<u32> {
        match &self.max_attempts_raw {
            Some(raw) => parse_max_attempts(raw),
            None => Ok(DEFAULT_MAX_ATTEMPTS),
        }
    }

    /// `ERROR_FILES` as a JSON array, or the fallback list
    pub fn affected_files(&self) -> Result<Vec<String>> {
        match &self.error_files_raw {
            Some(raw) => serde_json::from_str::<Vec<String>>(raw)
                .context("ERROR_FILES must be a JSON array of paths"),
            None => Ok(FALLBACK_FILES.iter().map(|f| f.to_string()).collect()),
        }
    }
}

pub fn parse_max_attempts(raw: &str) -> Result<u32> {
    let value: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("MAX_ATTEMPTS must be a positive integer, got {:?}", raw))?;
    if value == 0 {
        bail!("MAX_ATTEMPTS must be at least 1");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.credential, None);
        assert_eq!(config.max_attempts().unwrap(), 3);
        assert_eq!(
            config.affected_files().unwrap(),
            vec!["calculator/calculator.py", "tests/test_calculator.py"]
        );
        assert_eq!(config.bot_identity.name, "ci-bot");
        assert_eq!(config.output_file, PathBuf::from("output.txt"));
        assert_eq!(config.env_file, PathBuf::from("env.txt"));
        assert_eq!(config.run_id, "1");
        assert_eq!(config.changes_summary, None);
    }

    #[test]
    fn test_run_config_from_values() {
        let config = RunConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("MAX_ATTEMPTS", "5"),
            ("ERROR_FILES", r#"["a.py", "tests/test_a.py"]"#),
            ("GITHUB_ACTOR", "octo"),
            ("GITHUB_RUN_ID", "42"),
        ]))
        .unwrap();
        assert_eq!(config.credential.as_deref(), Some("sk-1"));
        assert_eq!(config.max_attempts().unwrap(), 5);
        assert_eq!(config.affected_files().unwrap(), vec!["a.py", "tests/test_a.py"]);
        assert_eq!(config.bot_identity.email, "octo@users.noreply.github.com");
        assert_eq!(config.run_id, "42");
    }

    #[test]
    fn test_invalid_values_fail_only_when_read() {
        let config = RunConfig::from_lookup(lookup(&[
            ("MAX_ATTEMPTS", "three"),
            ("ERROR_FILES", "a.py"),
            ("GITHUB_RUN_ID", "9"),
        ]))
        .unwrap();
        // Values the command does not need stay usable
        assert_eq!(config.run_id, "9");
        assert!(config.max_attempts().is_err());
        assert!(config.affected_files().is_err());

        let zero = RunConfig::from_lookup(lookup(&[("MAX_ATTEMPTS", "0")])).unwrap();
        assert!(zero.max_attempts().is_err());
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config =
            RunConfig::from_lookup(lookup(&[("OPENAI_API_KEY", " "), ("MAX_ATTEMPTS", "")]))
                .unwrap();
        assert_eq!(config.credential, None);
        assert_eq!(config.max_attempts().unwrap(), 3);
    }

    #[test]
    fn test_project_config_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(ProjectConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_project_config_partial_sections() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
[tools]
lint_command = "ruff check"

[model]
model = "gpt-4o-mini"

[extract]
merge = "concatenate"
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.tools.lint_command, "ruff check");
        assert_eq!(config.tools.test_command, "python -m pytest -v");
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.extract.merge, MergePolicy::Concatenate);
        assert_eq!(config.layout.tests_dir, PathBuf::from("tests"));
        assert_eq!(config.tools.linter().unwrap().program(), Path::new("ruff"));
    }

    #[test]
    fn test_project_config_unknown_field_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[tools]\nlinter = \"x\"\n").unwrap();
        assert!(ProjectConfig::load(dir.path()).is_err());
    }
}
