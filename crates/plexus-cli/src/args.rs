use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// How a command's result is rendered to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Parser)]
#[command(name = "plexus", version, about = "Decompose and run analytical queries as a DAG of worker agents")]
pub struct Cli {
    /// Workspace root (task store db, agent artifact trees, logs).
    /// Defaults to `$PLEXUS_PATH`, the platform data dir, or `~/.plexus`.
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    /// Disable colored output even on a terminal.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold a workspace: writes `plexus.toml` with default settings.
    Init {
        /// Overwrite an existing config instead of leaving it in place.
        #[arg(long)]
        force: bool,
    },

    /// Decompose a query into a DAG and print its structure, without executing it.
    Plan {
        query: String,

        /// Maximum number of subtasks Stage 1 may produce.
        #[arg(long, default_value_t = 5)]
        max_subtasks: usize,
    },

    /// Decompose and execute a query end to end, printing the consolidated answer.
    Run {
        query: String,

        #[arg(long, default_value_t = 5)]
        max_subtasks: usize,

        /// Skip the optional validator pass over the consolidated answer.
        #[arg(long)]
        skip_validation: bool,

        /// Override the configured worker pool size for this run.
        #[arg(long)]
        max_parallel: Option<usize>,
    },

    /// List the registered worker agents and the tools each may call.
    Agents,
}
