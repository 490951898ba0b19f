use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::{ToolConfig, ToolError, ToolOutput};

/// Utility for spawning tool processes
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Spawn a process, wait for it, and capture both output streams.
    ///
    /// A non-zero exit code is not an error here: test runners and linters
    /// exit non-zero precisely when they have something to report.
    pub async fn spawn(
        program: &Path,
        args: &[&str],
        config: &ToolConfig,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        debug!(
            program = %program.display(),
            args = ?args,
            working_dir = %config.working_dir.display(),
            "Spawning tool process"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&config.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ToolError::NotFound(program.display().to_string())
            }
            _ => ToolError::SpawnFailed(e),
        })?;

        let mut stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::ExecutionFailed("stdout not captured".into()))?;
        let mut stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| ToolError::ExecutionFailed("stderr not captured".into()))?;

        // Both pipes are drained together so neither can fill up and block the child
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let (stdout_read, stderr_read) = tokio::join!(
            stdout_handle.read_to_end(&mut stdout),
            stderr_handle.read_to_end(&mut stderr),
        );
        stdout_read
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to read stdout: {}", e)))?;
        stderr_read
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to read stderr: {}", e)))?;

        let status = child.wait().await?;
        let duration = start.elapsed();

        debug!(
            exit_code = status.code().unwrap_or(-1),
            duration_ms = duration.as_millis(),
            "Tool process completed"
        );

        Ok(ToolOutput::new(
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
            status.code().unwrap_or(-1),
            duration,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ToolConfig {
        ToolConfig::new(std::env::temp_dir())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_both_streams_and_exit_code() {
        let output = ProcessSpawner::spawn(
            Path::new("sh"),
            &["-c", "echo 'FAILED tests/test_a.py::test_x'; echo warn >&2; exit 1"],
            &config(),
        )
        .await
        .unwrap();
        assert_eq!(output.stdout, "FAILED tests/test_a.py::test_x\n");
        assert_eq!(output.stderr, "warn\n");
        assert_eq!(output.exit_code, 1);
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_large_stderr_does_not_block() {
        let output = ProcessSpawner::spawn(
            Path::new("sh"),
            &["-c", "i=0; while [ $i -lt 20000 ]; do echo line$i >&2; i=$((i+1)); done; echo done"],
            &config(),
        )
        .await
        .unwrap();
        assert_eq!(output.stdout, "done\n");
        assert_eq!(output.stderr.lines().count(), 20000);
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let err = ProcessSpawner::spawn(Path::new("autofix-no-such-tool"), &[], &config())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "autofix-no-such-tool"));
    }
}
