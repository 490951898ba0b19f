//! # autofix-tools
//!
//! Invocation of the test runner and linter whose output the repair
//! pipeline parses.
//!
//! ## Key Types
//!
//! - [`Tool`] - async trait over "run this tool, optionally scoped to files"
//! - [`CommandTool`] - a tool backed by an external command line
//! - [`ProcessSpawner`] - spawns a process and captures stdout/stderr
//! - [`ToolOutput`] - captured streams, exit code and duration

mod command;
mod output;
mod spawner;
mod traits;

pub use command::CommandTool;
pub use output::ToolOutput;
pub use spawner::ProcessSpawner;
pub use traits::{Tool, ToolConfig, ToolError, ToolKind};
