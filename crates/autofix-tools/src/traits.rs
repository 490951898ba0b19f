use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ToolOutput;

/// Errors that can occur while running an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to spawn tool process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool configuration error: {0}")]
    ConfigError(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
}

/// Configuration for tool execution
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Working directory the tool runs in
    pub working_dir: PathBuf,
}

impl ToolConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self { working_dir }
    }
}

/// The kind of diagnostics a tool produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    TestRunner,
    Linter,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolKind::TestRunner => write!(f, "tests"),
            ToolKind::Linter => write!(f, "lint"),
        }
    }
}

/// A test runner or linter the pipeline shells out to
#[async_trait]
pub trait Tool: Send + Sync {
    /// Human-readable name of the tool (e.g., "pytest", "pylint")
    fn name(&self) -> &str;

    /// What the tool reports on
    fn kind(&self) -> ToolKind;

    /// Run the tool over its default targets
    async fn run(&self, config: &ToolConfig) -> Result<ToolOutput, ToolError> {
        self.run_on(&[], config).await
    }

    /// Run the tool scoped to `targets` (empty = the tool's default targets)
    async fn run_on(&self, targets: &[&Path], config: &ToolConfig)
        -> Result<ToolOutput, ToolError>;

    /// Check if the tool is available on the system
    async fn is_available(&self, config: &ToolConfig) -> bool;
}
