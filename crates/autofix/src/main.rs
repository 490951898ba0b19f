use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use autofix_extract::MergePolicy;
use autofix_logging::{init_tracing, LogFormat, Logger};

mod config;
mod extract;
mod fix;
mod outputs;
mod publish;

use config::{ProjectConfig, RunConfig};
use outputs::OutputWriter;

#[derive(Parser, Debug)]
#[command(
    name = "autofix",
    about = "Repair failing CI runs by asking a completion model for fixes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Log output format: pretty, json or compact
    #[arg(long, default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Diagnostic log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Also append events as JSON lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Output final result as JSON
    #[arg(long, global = true)]
    json_output: bool,

    /// Dry run: show what would happen without executing
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect errors from log artifacts (or live tool runs) and export them
    Extract {
        /// How lint and test errors for one file combine: overwrite or concatenate
        /// (default: [extract].merge)
        #[arg(long)]
        merge: Option<MergePolicy>,
    },

    /// Attempt to repair each affected file, committing every change
    Fix {
        /// Maximum attempts per file (default: MAX_ATTEMPTS or 3)
        #[arg(short = 'n', long)]
        max_attempts: Option<u32>,

        /// Directory for the JSONL run record (default: ~/.local/share/autofix/runs)
        #[arg(long)]
        run_log_dir: Option<PathBuf>,

        /// Do not write a run record
        #[arg(long)]
        no_run_log: bool,
    },

    /// Push the fix commits to a new branch and open a draft pull request
    Publish {
        /// File holding the changes summary (default: CHANGES_SUMMARY)
        #[arg(long)]
        summary_file: Option<PathBuf>,

        /// File holding the error report (default: ERROR_DETAILS)
        #[arg(long)]
        errors_file: Option<PathBuf>,

        /// Branch the pull request targets
        #[arg(long, default_value = "main")]
        base: String,
    },
}

/// Everything a command needs, resolved once at startup
pub struct AppContext {
    pub working_dir: PathBuf,
    pub project: ProjectConfig,
    pub run: RunConfig,
    pub logger: Arc<Logger>,
    pub outputs: OutputWriter,
    pub json_output: bool,
    pub dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let log_format = cli.log_format;
    init_tracing(&cli.log_level, log_format);

    let logger = match &cli.log_file {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let project = ProjectConfig::load(&working_dir)?.unwrap_or_default();
    let run = RunConfig::from_env()?;
    let outputs = OutputWriter::new(
        working_dir.join(&run.output_file),
        working_dir.join(&run.env_file),
    );

    let app = AppContext {
        working_dir,
        project,
        run,
        logger: Arc::new(logger),
        outputs,
        json_output: cli.json_output,
        dry_run: cli.dry_run,
    };

    let exit_code = match cli.command {
        Command::Extract { merge } => extract::handle_extract(&app, merge).await?,
        Command::Fix {
            max_attempts,
            run_log_dir,
            no_run_log,
        } => {
            let run_log = if no_run_log {
                fix::RunLog::Disabled
            } else {
                fix::RunLog::Enabled(run_log_dir)
            };
            fix::handle_fix(&app, max_attempts, run_log).await?
        }
        Command::Publish {
            summary_file,
            errors_file,
            base,
        } => publish::handle_publish(&app, summary_file, errors_file, &base).await?,
    };

    std::process::exit(exit_code);
}
