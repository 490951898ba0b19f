use git2::{DiffOptions, Repository};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Git operation failed: {0}")]
    GitOperationFailed(#[from] git2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Path is outside the repository: {0}")]
    OutsideRepo(String),

    #[error("No commits in repository")]
    NoCommits,
}

/// Captures unified diffs of single files against the last commit
pub struct DiffCapture {
    context_lines: u32,
}

impl Default for DiffCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffCapture {
    pub fn new() -> Self {
        Self { context_lines: 3 }
    }

    /// Unified diff of `path` between HEAD and the working tree
    pub fn capture_file_diff(&self, working_dir: &Path, path: &Path) -> Result<String, GitError> {
        let repo = open_repo(working_dir)?;
        let relative = repo_relative_path(&repo, working_dir, path)?;
        let head_tree = head_tree(&repo)?;

        let mut opts = self.options(&relative);
        let diff = repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut opts))?;

        let mut diff_text = String::new();
        diff.print(git2::DiffFormat::Patch, |_delta, _hunk, line| {
            // Header lines ('F', 'H') carry their own text; content lines need the marker
            match line.origin() {
                '+' | '-' | ' ' => diff_text.push(line.origin()),
                _ => {}
            }
            if let Ok(content) = std::str::from_utf8(line.content()) {
                diff_text.push_str(content);
            }
            true
        })?;

        debug!(
            path = %relative.display(),
            diff_len = diff_text.len(),
            "Captured file diff"
        );

        Ok(diff_text)
    }

    fn options(&self, relative: &Path) -> DiffOptions {
        let mut opts = DiffOptions::new();
        opts.pathspec(relative)
            .disable_pathspec_match(true)
            .include_untracked(true)
            .show_untracked_content(true)
            .context_lines(self.context_lines);
        opts
    }
}

pub(crate) fn open_repo(working_dir: &Path) -> Result<Repository, GitError> {
    Repository::discover(working_dir)
        .map_err(|_| GitError::NotARepo(working_dir.display().to_string()))
}

/// HEAD's tree, or `None` in a repository without commits
pub(crate) fn head_tree(repo: &Repository) -> Result<Option<git2::Tree<'_>>, GitError> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_tree()?)),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
        Err(e) => Err(GitError::GitOperationFailed(e)),
    }
}

/// Resolve `path` (relative to `working_dir`, or absolute) to a path relative
/// to the repository root, as the index expects.
pub(crate) fn repo_relative_path(
    repo: &Repository,
    working_dir: &Path,
    path: &Path,
) -> Result<PathBuf, GitError> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| GitError::NotARepo("bare repository".into()))?;
    let workdir = workdir.canonicalize()?;

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };
    // Canonicalize through the parent so the file itself need not exist
    let parent = absolute.parent().unwrap_or(&absolute).canonicalize()?;
    let absolute = match absolute.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    };

    absolute
        .strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .map_err(|_| GitError::OutsideRepo(path.display().to_string()))
}
