use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output captured from a tool run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code from the process (-1 if killed by a signal)
    pub exit_code: i32,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl ToolOutput {
    pub fn new(stdout: String, stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            duration,
        }
    }

    /// Build an output from captured stdout only (used by fakes and replayed logs)
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self::new(stdout.into(), String::new(), 0, Duration::ZERO)
    }

    /// Check if the tool exited successfully
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Combined output: stdout followed directly by stderr
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output_joins_streams() {
        let output = ToolOutput::new("out".into(), "err".into(), 1, Duration::ZERO);
        assert_eq!(output.combined_output(), "out\nerr");
        assert!(!output.success());
    }

    #[test]
    fn test_combined_output_single_stream() {
        let output = ToolOutput::from_stdout("only stdout");
        assert_eq!(output.combined_output(), "only stdout");

        let output = ToolOutput::new(String::new(), "only stderr".into(), 0, Duration::ZERO);
        assert_eq!(output.combined_output(), "only stderr");
    }
}
