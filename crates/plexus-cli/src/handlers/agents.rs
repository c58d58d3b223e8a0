use anyhow::Result;
use plexus_agents::ToolLoader;

use crate::args::OutputFormat;
use crate::output::Paint;

pub fn handle(format: OutputFormat, paint: &Paint) -> Result<()> {
    let loader = ToolLoader::new();

    match format {
        OutputFormat::Json => {
            let agents: Vec<serde_json::Value> = loader
                .agents()
                .iter()
                .map(|agent| {
                    let tools: Vec<&str> = loader
                        .tools_for(agent.kind)
                        .iter()
                        .map(|t| t.tool_id.as_str())
                        .collect::<Vec<_>>()
                        .into_iter()
                        .collect();
                    serde_json::json!({
                        "agent_id": agent.kind.id(),
                        "display_name": agent.display_name,
                        "description": agent.description,
                        "keywords": agent.keywords,
                        "tools": tools,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&agents)?);
        }
        OutputFormat::Plain => {
            for agent in loader.agents() {
                println!("{}", paint.heading(&format!("{} ({})", agent.display_name, agent.kind.id())));
                println!("  {}", agent.description);
                let tool_ids: Vec<String> = loader
                    .tools_for(agent.kind)
                    .iter()
                    .map(|t| t.tool_id.clone())
                    .collect();
                println!("  {} {}", paint.dim("tools:"), tool_ids.join(", "));
                println!("  {} {}", paint.dim("keywords:"), agent.keywords.join(", "));
                println!();
            }
        }
    }

    Ok(())
}
