//! Step outputs and environment exports for the surrounding CI workflow.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends `key=value` / heredoc entries to the CI output and env files
pub struct OutputWriter {
    output_file: PathBuf,
    env_file: PathBuf,
}

impl OutputWriter {
    pub fn new(output_file: PathBuf, env_file: PathBuf) -> Self {
        Self {
            output_file,
            env_file,
        }
    }

    pub fn set_output(&self, key: &str, value: &str) -> Result<()> {
        append(&self.output_file, &format_entry(key, value, &new_delimiter()))
    }

    pub fn set_env(&self, key: &str, value: &str) -> Result<()> {
        append(&self.env_file, &format_entry(key, value, &new_delimiter()))
    }
}

fn new_delimiter() -> String {
    format!("ghadelimiter_{}", uuid::Uuid::new_v4())
}

/// `key=value` for single-line values, otherwise the `key<<DELIM` heredoc form
pub fn format_entry(key: &str, value: &str, delimiter: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter)
    } else {
        format!("{}={}\n", key, value)
    }
}

fn append(path: &Path, entry: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_entry() {
        assert_eq!(format_entry("fixed_any", "true", "D"), "fixed_any=true\n");
    }

    #[test]
    fn test_multi_line_entry_uses_heredoc() {
        assert_eq!(
            format_entry("changes_summary", "a\nb", "ghadelimiter_x"),
            "changes_summary<<ghadelimiter_x\na\nb\nghadelimiter_x\n"
        );
    }

    #[test]
    fn test_entries_are_appended() {
        let dir = tempfile::TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path().join("out/output.txt"), dir.path().join("env.txt"));
        writer.set_output("fixed_any", "false").unwrap();
        writer.set_output("changes_summary", "line 1\nline 2").unwrap();
        writer.set_env("ERROR_FILES", r#"["a.py"]"#).unwrap();

        let output = std::fs::read_to_string(dir.path().join("out/output.txt")).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("fixed_any=false"));
        let header = lines.next().unwrap();
        let delimiter = header.strip_prefix("changes_summary<<").unwrap();
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(lines.next(), Some("line 1"));
        assert_eq!(lines.next(), Some("line 2"));
        assert_eq!(lines.next(), Some(delimiter));

        let env = std::fs::read_to_string(dir.path().join("env.txt")).unwrap();
        assert_eq!(env, "ERROR_FILES=[\"a.py\"]\n");
    }
}
