use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for the extract / repair / publish pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        command: String,
        working_dir: PathBuf,
        files: usize,
    },
    ExtractionCompleted {
        tool: String,
        source: String,
        files: usize,
        errors: usize,
    },
    ToolFailed {
        tool: String,
        error: String,
    },
    FileSkipped {
        file: String,
        reason: String,
    },
    RepairStarted {
        file: String,
        errors: usize,
        max_attempts: u32,
    },
    AttemptStarted {
        file: String,
        attempt: u32,
        errors: usize,
    },
    AttemptNoChange {
        file: String,
        attempt: u32,
    },
    AttemptCommitted {
        file: String,
        attempt: u32,
        commit: String,
        insertions: usize,
        deletions: usize,
    },
    AttemptFailed {
        file: String,
        attempt: u32,
        error: String,
    },
    ErrorsRemaining {
        file: String,
        attempt: u32,
        errors: usize,
    },
    FileRepaired {
        file: String,
        attempts: u32,
    },
    FileExhausted {
        file: String,
        attempts: u32,
    },
    RepairInterrupted {
        file: String,
        attempt: u32,
    },
    RunCompleted {
        fixed: usize,
        files: usize,
        duration_secs: f64,
    },
    ErrorEncountered {
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for autofix events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted {
                command,
                working_dir,
                files,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "autofix".bold().bright_white(),
                    " ".repeat(60) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Command:".dimmed(),
                    Self::truncate_with_padding(&format!("{} ({} files)", command, files), 58, 67)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Dir:".dimmed(),
                    Self::truncate_with_padding(&working_dir.display().to_string(), 62, 71)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::ExtractionCompleted {
                tool,
                source,
                files,
                errors,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {} {} in {} {} {}",
                    "▶".bright_cyan(),
                    tool.to_uppercase().bright_cyan().bold(),
                    errors,
                    if *errors == 1 { "error" } else { "errors" },
                    files,
                    if *files == 1 { "file" } else { "files" },
                    format!("({})", source).dimmed()
                );
            }
            LogEvent::ToolFailed { tool, error } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} unavailable: {}",
                    "⚠".bright_yellow(),
                    tool,
                    error.dimmed()
                );
            }
            LogEvent::FileSkipped { file, reason } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "○".dimmed(),
                    file.dimmed(),
                    format!("skipped: {}", reason).dimmed()
                );
            }
            LogEvent::RepairStarted {
                file,
                errors,
                max_attempts,
            } => {
                let header = format!("─ {} ", file);
                let padding = "─".repeat(67usize.saturating_sub(header.chars().count()));
                let _ = writeln!(
                    stderr,
                    "{}{}{}",
                    "┌".bright_blue(),
                    header.bright_blue().bold(),
                    padding.bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "    {} {} {}, up to {} {}",
                    "•".dimmed(),
                    errors,
                    if *errors == 1 { "error" } else { "errors" },
                    max_attempts,
                    if *max_attempts == 1 { "attempt" } else { "attempts" }
                );
                let _ = writeln!(stderr);
            }
            LogEvent::AttemptStarted { attempt, errors, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} {}",
                    "▶".bright_magenta(),
                    format!("ATTEMPT {}", attempt).bright_magenta().bold(),
                    format!("({} outstanding)", errors).dimmed()
                );
            }
            LogEvent::AttemptNoChange { .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} {}",
                    "→".bright_yellow(),
                    "No change proposed".bright_yellow()
                );
            }
            LogEvent::AttemptCommitted {
                commit,
                insertions,
                deletions,
                ..
            } => {
                let short = commit.get(..7).unwrap_or(commit);
                let _ = writeln!(
                    stderr,
                    "    {} {} {} {}, {}",
                    "📁".dimmed(),
                    "Committed".dimmed(),
                    short.bright_white(),
                    format!("+{}", insertions).green(),
                    format!("-{}", deletions).red()
                );
            }
            LogEvent::AttemptFailed { error, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} {}",
                    "✗".bright_red(),
                    error.bright_red()
                );
            }
            LogEvent::ErrorsRemaining { errors, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} {} remaining",
                    "→".bright_yellow(),
                    errors,
                    if *errors == 1 { "error" } else { "errors" }
                );
                let _ = writeln!(stderr);
            }
            LogEvent::FileRepaired { attempts, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Fixed after {} {}",
                    "✓".bright_green(),
                    attempts,
                    if *attempts == 1 { "attempt" } else { "attempts" }
                );
                Self::footer(&mut stderr);
            }
            LogEvent::FileExhausted { attempts, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Still failing after {} {}",
                    "⚠".bright_yellow(),
                    attempts,
                    if *attempts == 1 { "attempt" } else { "attempts" }
                );
                Self::footer(&mut stderr);
            }
            LogEvent::RepairInterrupted { attempt, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Interrupted before attempt {}",
                    "⚠".bright_yellow(),
                    attempt
                );
                Self::footer(&mut stderr);
            }
            LogEvent::RunCompleted { .. } => {
                // Final outcome is printed by the binary
            }
            LogEvent::ErrorEncountered { error } => {
                let _ = writeln!(stderr);
                let _ = writeln!(stderr, "{} {}", "✗".bright_red(), error.bright_red());
            }
        }
    }

    fn footer(stderr: &mut std::io::Stderr) {
        let _ = writeln!(
            stderr,
            "{}",
            "└─────────────────────────────────────────────────────────────────────┘"
                .bright_blue()
        );
        let _ = writeln!(stderr);
    }

    fn log_compact(&self, event: &LogEvent) {
        let timestamp = chrono::Utc::now().format("%H:%M:%S").to_string();
        let _ = writeln!(std::io::stderr(), "{}", Self::compact_line(event, &timestamp));
    }

    /// Single-line rendering used by [`LogFormat::Compact`]
    pub fn compact_line(event: &LogEvent, timestamp: &str) -> String {
        match event {
            LogEvent::RunStarted { command, files, .. } => {
                format!("[{}] run:start {} files={}", timestamp, command, files)
            }
            LogEvent::ExtractionCompleted {
                tool,
                source,
                files,
                errors,
            } => format!(
                "[{}] extract:{} {}f {}e ({})",
                timestamp, tool, files, errors, source
            ),
            LogEvent::ToolFailed { tool, error } => {
                format!("[{}] tool:fail:{} {}", timestamp, tool, error)
            }
            LogEvent::FileSkipped { file, reason } => {
                format!("[{}] skip:{} {}", timestamp, file, reason)
            }
            LogEvent::RepairStarted {
                file,
                errors,
                max_attempts,
            } => format!(
                "[{}] repair:start:{} errors={} max={}",
                timestamp, file, errors, max_attempts
            ),
            LogEvent::AttemptStarted {
                file,
                attempt,
                errors,
            } => format!(
                "[{}] attempt:start:{}:{} errors={}",
                timestamp, file, attempt, errors
            ),
            LogEvent::AttemptNoChange { file, attempt } => {
                format!("[{}] attempt:noop:{}:{}", timestamp, file, attempt)
            }
            LogEvent::AttemptCommitted {
                file,
                attempt,
                commit,
                insertions,
                deletions,
            } => format!(
                "[{}] attempt:commit:{}:{} {} +{} -{}",
                timestamp,
                file,
                attempt,
                commit.get(..7).unwrap_or(commit),
                insertions,
                deletions
            ),
            LogEvent::AttemptFailed {
                file,
                attempt,
                error,
            } => format!("[{}] attempt:fail:{}:{} {}", timestamp, file, attempt, error),
            LogEvent::ErrorsRemaining {
                file,
                attempt,
                errors,
            } => format!(
                "[{}] attempt:remaining:{}:{} errors={}",
                timestamp, file, attempt, errors
            ),
            LogEvent::FileRepaired { file, attempts } => {
                format!("[{}] repair:fixed:{} attempts={}", timestamp, file, attempts)
            }
            LogEvent::FileExhausted { file, attempts } => {
                format!(
                    "[{}] repair:exhausted:{} attempts={}",
                    timestamp, file, attempts
                )
            }
            LogEvent::RepairInterrupted { file, attempt } => {
                format!("[{}] repair:interrupted:{}:{}", timestamp, file, attempt)
            }
            LogEvent::RunCompleted {
                fixed,
                files,
                duration_secs,
            } => format!(
                "[{}] run:done fixed={}/{} {:.1}s",
                timestamp, fixed, files, duration_secs
            ),
            LogEvent::ErrorEncountered { error } => format!("[{}] error:{}", timestamp, error),
        }
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = LogEvent::AttemptNoChange {
            file: "calculator/calculator.py".into(),
            attempt: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "attempt_no_change");
        assert_eq!(json["attempt"], 2);
        assert!(event.with_timestamp().get("timestamp").is_some());
    }

    #[test]
    fn test_compact_lines() {
        let event = LogEvent::AttemptCommitted {
            file: "calculator/calculator.py".into(),
            attempt: 1,
            commit: "0123456789abcdef".into(),
            insertions: 1,
            deletions: 1,
        };
        assert_eq!(
            Logger::compact_line(&event, "12:00:00"),
            "[12:00:00] attempt:commit:calculator/calculator.py:1 0123456 +1 -1"
        );

        let event = LogEvent::FileExhausted {
            file: "a.py".into(),
            attempts: 3,
        };
        assert_eq!(
            Logger::compact_line(&event, "12:00:00"),
            "[12:00:00] repair:exhausted:a.py attempts=3"
        );
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("fancy".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_truncate_with_padding() {
        let padded = Logger::truncate_with_padding("short", 10, 12);
        assert_eq!(padded, format!("short{}│", " ".repeat(6)));
        let cut = Logger::truncate_with_padding("a-very-long-path", 8, 10);
        assert_eq!(cut, "a-ver... │");
    }

    #[test]
    fn test_file_output_is_json_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs/run.log");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();
        logger.log(&LogEvent::FileRepaired {
            file: "a.py".into(),
            attempts: 1,
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(line["event"], "file_repaired");
        assert_eq!(line["file"], "a.py");
    }
}
