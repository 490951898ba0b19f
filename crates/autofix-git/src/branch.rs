use git2::build::CheckoutBuilder;
use std::path::Path;
use tracing::info;

use crate::diff::open_repo;
use crate::GitError;

/// Create `name` at HEAD and switch to it. The working tree is left untouched.
pub fn create_branch_and_checkout(working_dir: &Path, name: &str) -> Result<(), GitError> {
    let repo = open_repo(working_dir)?;
    let head = match repo.head() {
        Ok(head) => head.peel_to_commit()?,
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Err(GitError::NoCommits),
        Err(e) => return Err(e.into()),
    };

    let branch = repo.branch(name, &head, false)?;
    let refname = branch
        .get()
        .name()
        .ok_or_else(|| GitError::NotARepo(format!("invalid branch name: {}", name)))?
        .to_string();

    repo.set_head(&refname)?;
    repo.checkout_head(Some(CheckoutBuilder::new().safe()))?;

    info!(branch = name, commit = %head.id(), "Switched to new branch");
    Ok(())
}
