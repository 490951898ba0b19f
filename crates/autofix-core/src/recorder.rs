use std::path::{Path, PathBuf};

use autofix_git::{Committer, DiffCapture};

use crate::RepairError;

/// File access and version control as seen by the repair loop
pub trait ChangeRecorder: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    fn read(&self, path: &str) -> Result<String, RepairError>;

    /// Replace the whole file
    fn write(&self, path: &str, content: &str) -> Result<(), RepairError>;

    /// Unified diff of `path` against the last commit
    fn diff(&self, path: &str) -> Result<String, RepairError>;

    /// Stage and commit `path`; returns the commit id
    fn commit(&self, path: &str, message: &str) -> Result<String, RepairError>;
}

/// [`ChangeRecorder`] over a git working tree
pub struct GitRecorder {
    working_dir: PathBuf,
    diff_capture: DiffCapture,
    committer: Committer,
}

impl GitRecorder {
    pub fn new(working_dir: PathBuf, diff_capture: DiffCapture, committer: Committer) -> Self {
        Self {
            working_dir,
            diff_capture,
            committer,
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.working_dir.join(path)
    }
}

impl ChangeRecorder for GitRecorder {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &str) -> Result<String, RepairError> {
        std::fs::read_to_string(self.resolve(path)).map_err(|source| RepairError::IoError {
            path: path.to_string(),
            source,
        })
    }

    fn write(&self, path: &str, content: &str) -> Result<(), RepairError> {
        std::fs::write(self.resolve(path), content).map_err(|source| RepairError::IoError {
            path: path.to_string(),
            source,
        })
    }

    fn diff(&self, path: &str) -> Result<String, RepairError> {
        Ok(self
            .diff_capture
            .capture_file_diff(&self.working_dir, Path::new(path))?)
    }

    fn commit(&self, path: &str, message: &str) -> Result<String, RepairError> {
        Ok(self
            .committer
            .commit_file(&self.working_dir, Path::new(path), message)?)
    }
}
