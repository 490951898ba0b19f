//! # autofix-git
//!
//! Git operations for the autofix repair loop.
//!
//! Every accepted fix is captured as a unified diff against the last commit
//! and then committed as the bot, one commit per attempt. The diffs become
//! the change summary handed to the publish step.
//!
//! ## Key Types
//!
//! - [`DiffCapture`] - Unified diff of a single file against HEAD
//! - [`Committer`] - Stages and commits a single file as a [`BotIdentity`]
//! - [`GitStatus`] - Current git repository status
//!
//! ## Usage
//!
//! ```rust,ignore
//! use autofix_git::{BotIdentity, Committer, DiffCapture};
//! use std::path::Path;
//!
//! let dir = Path::new(".");
//! let file = Path::new("calculator/calculator.py");
//!
//! // ... fixed content written to `file` ...
//!
//! let diff = DiffCapture::new().capture_file_diff(dir, file)?;
//! let committer = Committer::new(BotIdentity::from_actor("ci-bot"));
//! committer.commit_file(dir, file, "fix: Auto-fix attempt 1 for calculator/calculator.py")?;
//! ```

mod branch;
mod commit;
mod diff;
mod status;

pub use branch::create_branch_and_checkout;
pub use commit::{BotIdentity, Committer};
pub use diff::{DiffCapture, GitError};
pub use status::GitStatus;
