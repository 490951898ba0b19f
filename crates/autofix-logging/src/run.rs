use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Each line type in a run's JSONL record
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunLine {
    RunStart {
        timestamp: DateTime<Utc>,
        command: String,
        working_dir: PathBuf,
        files: Vec<String>,
        max_attempts: u32,
        model: Option<String>,
    },
    Attempt {
        file: String,
        attempt: u32,
        outcome: String,
        diff: String,
        remaining_errors: usize,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    FileEnd {
        file: String,
        outcome: String,
        attempts: u32,
        timestamp: DateTime<Utc>,
    },
    RunEnd {
        fixed: usize,
        files: usize,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

/// Writes run data as JSONL, by default under `~/.local/share/autofix/runs/`.
pub struct RunWriter {
    file: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl RunWriter {
    /// Open a new run file in `dir` (or the default runs directory). The name is
    /// the UTC start time plus a short hash of `seed`.
    pub fn new(dir: Option<&Path>, seed: &str) -> io::Result<Self> {
        let runs_dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => Self::runs_dir()?,
        };
        fs::create_dir_all(&runs_dir)?;

        let now = Utc::now();
        let timestamp_str = now.format("%Y-%m-%dT%H-%M-%SZ").to_string();

        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        let hash = hex::encode(hasher.finalize());
        let short_hash = &hash[..6];

        let filename = format!("{}_{}.jsonl", timestamp_str, short_hash);
        let path = runs_dir.join(filename);

        let file = File::create(&path)?;
        let writer = BufWriter::new(file);

        Ok(Self {
            file: Mutex::new(writer),
            path,
        })
    }

    /// Returns the path to the run file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_start(
        &self,
        command: &str,
        working_dir: &Path,
        files: &[String],
        max_attempts: u32,
        model: Option<&str>,
    ) {
        self.write_line(&RunLine::RunStart {
            timestamp: Utc::now(),
            command: command.to_string(),
            working_dir: working_dir.to_path_buf(),
            files: files.to_vec(),
            max_attempts,
            model: model.map(String::from),
        });
    }

    /// Accepts individual fields so this crate stays independent of autofix-core.
    pub fn write_attempt(
        &self,
        file: &str,
        attempt: u32,
        outcome: &str,
        diff: &str,
        remaining_errors: usize,
        error: Option<&str>,
    ) {
        self.write_line(&RunLine::Attempt {
            file: file.to_string(),
            attempt,
            outcome: outcome.to_string(),
            diff: diff.to_string(),
            remaining_errors,
            error: error.map(String::from),
            timestamp: Utc::now(),
        });
    }

    pub fn write_file_end(&self, file: &str, outcome: &str, attempts: u32) {
        self.write_line(&RunLine::FileEnd {
            file: file.to_string(),
            outcome: outcome.to_string(),
            attempts,
            timestamp: Utc::now(),
        });
    }

    pub fn write_end(&self, fixed: usize, files: usize, duration_secs: f64) {
        self.write_line(&RunLine::RunEnd {
            fixed,
            files,
            duration_secs,
            timestamp: Utc::now(),
        });
    }

    fn write_line(&self, line: &RunLine) {
        if let Ok(json) = serde_json::to_string(line) {
            if let Ok(mut writer) = self.file.lock() {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
    }

    fn runs_dir() -> io::Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        Ok(data_dir.join("autofix").join("runs"))
    }
}
