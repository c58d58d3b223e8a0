use anyhow::Result;
use clap::CommandFactory;
use plexus_core::Config;

use crate::args::{Cli, Commands};
use crate::handlers;
use crate::output::Paint;

pub async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let paint = Paint::new(cli.no_color);
    let config = Config::load(cli.workspace.as_deref())?;

    match command {
        Commands::Init { force } => handlers::init::handle(config, force, cli.format, &paint),
        Commands::Plan { query, max_subtasks } => {
            handlers::plan::handle(query, max_subtasks, cli.format, &paint)
        }
        Commands::Run {
            query,
            max_subtasks,
            skip_validation,
            max_parallel,
        } => {
            handlers::run::handle(
                config,
                query,
                max_subtasks,
                skip_validation,
                max_parallel,
                cli.format,
                paint,
            )
            .await
        }
        Commands::Agents => handlers::agents::handle(cli.format, &paint),
    }
}
