use git2::Signature;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::diff::{open_repo, repo_relative_path};
use crate::GitError;

/// Name and e-mail the bot commits as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub name: String,
    pub email: String,
}

impl BotIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// `<actor>@users.noreply.github.com`
    pub fn from_actor(actor: &str) -> Self {
        Self::new(actor, format!("{}@users.noreply.github.com", actor))
    }
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self::from_actor("ci-bot")
    }
}

/// Stages and commits single files as the bot
pub struct Committer {
    identity: BotIdentity,
}

impl Committer {
    pub fn new(identity: BotIdentity) -> Self {
        Self { identity }
    }

    /// Stage `path` and commit it on top of HEAD. Returns the new commit id.
    pub fn commit_file(
        &self,
        working_dir: &Path,
        path: &Path,
        message: &str,
    ) -> Result<String, GitError> {
        let repo = open_repo(working_dir)?;
        let relative = repo_relative_path(&repo, working_dir, path)?;

        let mut index = repo.index()?;
        index.add_path(&relative)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };

        let sig = Signature::now(&self.identity.name, &self.identity.email)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        debug!(path = %relative.display(), "Staged and committed");
        info!(commit = %oid, message, "Created commit");

        Ok(oid.to_string())
    }
}
