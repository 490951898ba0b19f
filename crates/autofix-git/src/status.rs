use git2::{Status, StatusOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::diff::open_repo;
use crate::GitError;

/// Status of the git working directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitStatus {
    pub modified: Vec<String>,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

impl GitStatus {
    pub fn capture(working_dir: &Path) -> Result<Self, GitError> {
        let repo = open_repo(working_dir)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);

        let mut status = GitStatus::default();
        for entry in repo.statuses(Some(&mut opts))?.iter() {
            let Some(path) = entry.path() else { continue };
            let path = path.to_string();
            let flags = entry.status();

            if flags.intersects(Status::WT_NEW) {
                status.untracked.push(path);
            } else if flags.intersects(Status::INDEX_NEW) {
                status.added.push(path);
            } else if flags.intersects(Status::WT_DELETED | Status::INDEX_DELETED) {
                status.deleted.push(path);
            } else if flags.intersects(
                Status::WT_MODIFIED
                    | Status::INDEX_MODIFIED
                    | Status::WT_RENAMED
                    | Status::INDEX_RENAMED
                    | Status::WT_TYPECHANGE
                    | Status::INDEX_TYPECHANGE,
            ) {
                status.modified.push(path);
            }
        }

        Ok(status)
    }

    pub fn is_clean(&self) -> bool {
        self.modified.is_empty()
            && self.added.is_empty()
            && self.deleted.is_empty()
            && self.untracked.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.modified.len() + self.added.len() + self.deleted.len() + self.untracked.len()
    }
}
