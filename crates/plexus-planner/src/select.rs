use std::collections::HashMap;

use plexus_agents::ToolLoader;
use plexus_graph::DependencyAnalyzer;
use plexus_types::{AgentKind, PathPlan, Plan, SessionContext, ToolSelection};

use crate::error::Result;
use crate::extractors::{extract_generic, extract_prediction_search, extract_sql_market};

/// Runs Stage 2: for each leaf-to-root dependency path in `plan`, selects
/// a tool for every task on the path and extracts its call parameters.
///
/// Paths are planned independently of one another — task `t3`'s
/// parameter extraction never sees context from a sibling path that also
/// depends on `t3`'s ancestor, only from `t3`'s own chain.
pub fn plan_stage2(plan: &Plan, loader: &ToolLoader, session: &SessionContext) -> Result<Vec<PathPlan>> {
    let analyzer = DependencyAnalyzer::analyze(plan)?;
    let paths = analyzer.leaf_to_root_paths();

    let mut path_plans = Vec::with_capacity(paths.len());
    for (i, path) in paths.into_iter().enumerate() {
        let mut tool_selections = HashMap::new();
        for task_id in &path {
            let subtask = plan.subtask(task_id).expect("path task came from plan");
            let agent = match subtask.agent {
                Some(agent) => agent,
                // Unmappable: nothing in the registry scored against this
                // description, so there's no tool to select. Leave the
                // task out of Stage 2's output; the executor skips it.
                None => continue,
            };

            let tools = loader.tools_for(agent);
            let tool_id = tools
                .first()
                .map(|t| t.tool_id.clone())
                .unwrap_or_else(|| format!("{}.unresolved", agent.id()));

            let (parameters, needs_review) = match agent {
                AgentKind::MarketDataSql => extract_sql_market(subtask),
                AgentKind::PredictionMarketSearch => extract_prediction_search(subtask, session),
                _ => extract_generic(subtask),
            };

            tool_selections.insert(
                task_id.to_string(),
                ToolSelection {
                    tool_id,
                    parameters,
                    needs_review,
                },
            );
        }

        path_plans.push(PathPlan {
            path_id: format!("path-{}", i + 1),
            task_ids: path.iter().map(|s| s.to_string()).collect(),
            tool_selections,
        });
    }

    Ok(path_plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use plexus_types::{generate_session_id, Query, RunId, Subtask};

    fn subtask(id: &str, agent: AgentKind, deps: &[&str], description: &str) -> Subtask {
        Subtask {
            task_id: id.to_string(),
            description: description.to_string(),
            agent: Some(agent),
            mappable: true,
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            script_refs: vec![],
        }
    }

    fn session() -> SessionContext {
        let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2026-07-28T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        SessionContext::new(RunId::new("20260728143000_abcdef"), generate_session_id(now, "s"))
    }

    #[test]
    fn single_task_plan_gets_one_path() {
        let loader = ToolLoader::new();
        let plan = Plan {
            plan_id: "p1".into(),
            query: Query::new("closing price of ZN"),
            subtasks: vec![subtask(
                "t1",
                AgentKind::MarketDataSql,
                &[],
                "what is the closing price of ZN futures",
            )],
        };
        let paths = plan_stage2(&plan, &loader, &session()).unwrap();
        assert_eq!(paths.len(), 1);
        let selection = &paths[0].tool_selections["t1"];
        assert_eq!(selection.tool_id, "market_data_sql.query");
        assert_eq!(selection.parameters.get("symbol_pattern").unwrap(), "%ZN%");
    }

    #[test]
    fn diamond_plan_produces_two_paths() {
        let loader = ToolLoader::new();
        let plan = Plan {
            plan_id: "p2".into(),
            query: Query::new("compare ZN and a prediction market"),
            subtasks: vec![
                subtask("root", AgentKind::MarketDataSql, &[], "fetch ZN closing price"),
                subtask("b", AgentKind::Analytics, &["root"], "compute the daily return"),
                subtask("c", AgentKind::PredictionMarketSearch, &["root"], "search prediction markets for recession odds"),
            ],
        };
        let paths = plan_stage2(&plan, &loader, &session()).unwrap();
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert!(path.task_ids.contains(&"root".to_string()));
        }
    }
}
