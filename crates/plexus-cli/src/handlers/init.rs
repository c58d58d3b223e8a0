use anyhow::{bail, Result};
use plexus_core::Config;

use crate::args::OutputFormat;
use crate::output::Paint;

pub fn handle(config: Config, force: bool, format: OutputFormat, paint: &Paint) -> Result<()> {
    let config_path = config.workspace_root.join("plexus.toml");
    if config_path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        );
    }

    config.save()?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "workspace_root": config.workspace_root,
                    "config_path": config_path,
                }))?
            );
        }
        OutputFormat::Plain => {
            println!(
                "{} {}",
                paint.success("Initialized workspace at"),
                config.workspace_root.display()
            );
            println!("  config:        {}", config_path.display());
            println!("  max_parallel:  {}", config.max_parallel);
            println!("  task_timeout:  {}s", config.task_timeout_secs);
        }
    }

    Ok(())
}
