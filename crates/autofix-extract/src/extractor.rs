use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use autofix_tools::{Tool, ToolConfig};

use crate::{FileErrorMap, LogParser, MergePolicy};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid artifact pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read log artifact {}: {source}", path.display())]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where an extraction pass got its text from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    /// Pre-collected `*.log` files
    Artifacts { files: usize },
    /// The tool was run live
    LiveRun { exit_code: i32 },
    /// Neither worked; the pass produced nothing
    Unavailable { reason: String },
}

/// Result of one extraction pass
#[derive(Debug, Clone)]
pub struct Extraction {
    pub errors: FileErrorMap,
    pub source: LogSource,
}

/// Reads collected logs for one tool, falling back to a live run
pub struct LogExtractor<'a> {
    parser: &'a dyn LogParser,
    tool: &'a dyn Tool,
    artifacts_dir: PathBuf,
}

impl<'a> LogExtractor<'a> {
    pub fn new(parser: &'a dyn LogParser, tool: &'a dyn Tool, artifacts_dir: PathBuf) -> Self {
        Self {
            parser,
            tool,
            artifacts_dir,
        }
    }

    /// Extract errors. Never fails: a tool that cannot run degrades to an
    /// empty map with [`LogSource::Unavailable`].
    pub async fn extract(&self, config: &ToolConfig) -> Extraction {
        let artifacts_dir = if self.artifacts_dir.is_absolute() {
            self.artifacts_dir.clone()
        } else {
            config.working_dir.join(&self.artifacts_dir)
        };

        match self.read_artifacts(&artifacts_dir) {
            Ok(logs) if !logs.is_empty() => {
                info!(tool = self.tool.name(), files = logs.len(), "Parsing collected logs");
                let mut errors = FileErrorMap::new();
                for log in &logs {
                    errors.merge(self.parser.parse(log), MergePolicy::Concatenate);
                }
                return Extraction {
                    errors,
                    source: LogSource::Artifacts { files: logs.len() },
                };
            }
            Ok(_) => {
                debug!(dir = %artifacts_dir.display(), "No collected logs, running tool");
            }
            Err(e) => {
                warn!(error = %e, "Could not read collected logs, running tool");
            }
        }

        match self.tool.run(config).await {
            Ok(output) => Extraction {
                errors: self.parser.parse(&output.combined_output()),
                source: LogSource::LiveRun {
                    exit_code: output.exit_code,
                },
            },
            Err(e) => {
                warn!(tool = self.tool.name(), error = %e, "Error running tool");
                Extraction {
                    errors: FileErrorMap::new(),
                    source: LogSource::Unavailable {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Contents of every `*.log` in `dir`, in path order
    fn read_artifacts(&self, dir: &Path) -> Result<Vec<String>, ExtractError> {
        let pattern = dir.join("*.log");
        let mut logs = Vec::new();

        for entry in glob::glob(&pattern.to_string_lossy())? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable log entry");
                    continue;
                }
            };
            let content = std::fs::read_to_string(&path).map_err(|source| {
                ExtractError::ReadArtifact {
                    path: path.clone(),
                    source,
                }
            })?;
            logs.push(content);
        }

        Ok(logs)
    }
}
