//! CLI entry points for plexus: decompose a query into a DAG (`plan`),
//! run it end to end (`run`), inspect the static agent registry
//! (`agents`), and scaffold a workspace config (`init`). Thin over
//! `plexus-sdk`; no engine logic lives here.

mod args;
mod commands;
mod handlers;
mod output;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::run;
