use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("Fix request failed: {0}")]
    FixError(#[from] autofix_llm::FixError),

    #[error("Git error: {0}")]
    GitError(#[from] autofix_git::GitError),

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RepairError {
    /// Fatal errors abort the whole run; all others only cost the current attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RepairError::FixError(e) if e.is_fatal())
    }
}
