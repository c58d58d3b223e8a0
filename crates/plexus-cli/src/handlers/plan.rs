use anyhow::Result;
use chrono::Utc;
use plexus_agents::ToolLoader;
use plexus_graph::DependencyAnalyzer;
use plexus_planner::{decompose, plan_stage2};
use plexus_types::{generate_run_id, generate_session_id, Query, SessionContext};

use crate::args::OutputFormat;
use crate::output::Paint;

/// Decomposes `query` and prints the resulting DAG's structure — agent
/// mapping, parallel groups, dependency paths, and Stage 2's tool
/// selections — without dispatching any agent invocation.
pub fn handle(query: String, max_subtasks: usize, format: OutputFormat, paint: &Paint) -> Result<()> {
    let loader = ToolLoader::new();
    let started_at = Utc::now();
    let salt = format!("{}@{}", query, started_at.to_rfc3339());
    let run_id = generate_run_id(started_at, &salt);
    let session = SessionContext::new(run_id.clone(), generate_session_id(started_at, &salt));

    let plan = decompose(None, &loader, run_id.to_string(), Query::new(query), max_subtasks)?;
    let analyzer = DependencyAnalyzer::analyze(&plan)?;
    let groups = analyzer.parallel_groups();
    let paths = analyzer.leaf_to_root_paths();
    let path_plans = plan_stage2(&plan, &loader, &session)?;

    if format == OutputFormat::Json {
        let groups_json: Vec<Vec<&str>> = groups.iter().map(|g| g.clone()).collect();
        let paths_json: Vec<Vec<&str>> = paths.iter().map(|p| p.clone()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "plan_id": plan.plan_id,
                "subtasks": plan.subtasks,
                "parallel_groups": groups_json,
                "dependency_paths": paths_json,
                "path_plans": path_plans,
            }))?
        );
        return Ok(());
    }

    println!("{}", paint.heading(&format!("plan {}", plan.plan_id)));
    for subtask in &plan.subtasks {
        let deps = if subtask.depends_on.is_empty() {
            "-".to_string()
        } else {
            subtask.depends_on.join(", ")
        };
        let agent_label = subtask.agent.map(|a| a.id()).unwrap_or("unmapped");
        println!(
            "  {} [{}] depends_on=({}) {}",
            subtask.task_id,
            agent_label,
            deps,
            paint.dim(&subtask.description),
        );
    }

    println!();
    println!("{}", paint.heading("parallel groups"));
    for (i, group) in groups.iter().enumerate() {
        println!("  layer {}: {}", i, group.join(", "));
    }

    println!();
    println!("{}", paint.heading("dependency paths"));
    for path in &paths {
        println!("  {}", path.join(" -> "));
    }

    println!();
    println!("{}", paint.heading("tool selections"));
    for path_plan in &path_plans {
        println!("  {} ({})", path_plan.path_id, path_plan.task_ids.join(" -> "));
        for task_id in &path_plan.task_ids {
            if let Some(selection) = path_plan.tool_selections.get(task_id) {
                let flag = if selection.needs_review {
                    paint.warn(" needs_review")
                } else {
                    String::new()
                };
                println!("    {} -> {}{}", task_id, selection.tool_id, flag);
            }
        }
    }

    Ok(())
}
