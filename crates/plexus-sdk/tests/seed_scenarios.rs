//! End-to-end tests exercising `plexus_sdk::run` against a handful of
//! representative queries, from a bare keyword-routed single task through
//! planner-driven chains, independent fan-out, upstream-failure skipping,
//! cycle rejection, and cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use plexus_agents::{AgentInvoker, EchoInvoker};
use plexus_planner::decompose;
use plexus_sdk::RunOptions;
use plexus_testing::assertions::parallel_groups;
use plexus_testing::fixtures::{FixedPlanner, ScriptedInvoker};
use plexus_testing::TestWorkspace;
use plexus_types::Query;
use serde_json::Value;

#[tokio::test]
async fn show_all_call_options_routes_to_market_data_sql_with_suffix_pattern() {
    let workspace = TestWorkspace::new();
    let options = workspace.run_options();

    let result = plexus_sdk::run(Query::new("Show all call options"), options)
        .await
        .unwrap();

    assert_eq!(result.metadata.total_tasks, 1);
    assert_eq!(result.metadata.successful_tasks, 1);
    assert_eq!(result.metadata.failed_tasks, 0);
    assert_eq!(result.metadata.agents_used, vec!["market_data_sql".to_string()]);

    let rows = result.data_by_agent.get("market_data_sql").expect("market data output");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["symbol_pattern"], Value::String("%.C".to_string()));
}

#[tokio::test]
async fn most_recent_zn_closing_price_between_produces_single_ordered_task() {
    let workspace = TestWorkspace::new();
    let options = workspace.run_options();

    let query = Query::new("Most recent date when ZN closing price was between 112.5 and 112.9");
    let result = plexus_sdk::run(query, options).await.unwrap();

    assert_eq!(result.metadata.total_tasks, 1);
    assert_eq!(result.metadata.successful_tasks, 1);

    let rows = result.data_by_agent.get("market_data_sql").expect("market data output");
    let row = &rows[0];
    assert_eq!(row["symbol_pattern"], Value::String("%ZN%".to_string()));
    assert_eq!(row["conditions"], Value::String("symbol LIKE ? AND price BETWEEN ? AND ?".to_string()));
    assert_eq!(row["values"], serde_json::json!(["%ZN%", 112.5, 112.9]));
    assert_eq!(row["order_by_column"], Value::String("file_date".to_string()));
    assert_eq!(row["order_by_direction"], Value::String("DESC".to_string()));
    assert_eq!(row["limit"], serde_json::json!(1));
}

#[tokio::test]
async fn bitcoin_predictions_and_market_data_run_as_independent_parallel_tasks() {
    let loader = plexus_agents::ToolLoader::new();
    let planner = FixedPlanner::two_independent_tasks();
    let plan = decompose(Some(&planner), &loader, "plan-3", Query::new("bitcoin"), 5).unwrap();
    let groups = parallel_groups(&plan);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);

    let workspace = TestWorkspace::new();
    let mut options = workspace.run_options();

    let mut responses: HashMap<String, Vec<Value>> = HashMap::new();
    responses.insert(
        "prediction_market_search.search".to_string(),
        vec![serde_json::json!({"contract_name": "BTC > 100k by EOY", "probability": 0.3})],
    );
    responses.insert(
        "market_data_sql.query".to_string(),
        vec![serde_json::json!({"symbol": "BTC", "value": 64000.0})],
    );
    let invoker: Arc<dyn AgentInvoker> = Arc::new(ScriptedInvoker::new(responses));

    options.planner = Some(Box::new(FixedPlanner::two_independent_tasks()));
    options.invoker = invoker;

    let result = plexus_sdk::run(Query::new("Bitcoin predictions and Bitcoin market data"), options)
        .await
        .unwrap();

    assert_eq!(result.metadata.total_tasks, 2);
    assert_eq!(result.metadata.successful_tasks, 2);
    assert_eq!(result.metadata.failed_tasks, 0);
    assert!(result.data_by_agent.contains_key("prediction_market_search"));
    assert!(result.data_by_agent.contains_key("market_data_sql"));
}

/// Fails the middle step of a three-step chain (identified by its
/// distinctive description text, since the invoker only ever sees a tool
/// id and parameters, not the originating task id).
struct EnrichFailsInvoker;

impl AgentInvoker for EnrichFailsInvoker {
    fn invoke(&self, tool_id: &str, parameters: &HashMap<String, Value>) -> plexus_agents::Result<plexus_types::ArtifactPayload> {
        let is_enrich_step = parameters
            .get("query")
            .and_then(|v| v.as_str())
            .map(|q| q.contains("daily return"))
            .unwrap_or(false);
        if is_enrich_step {
            return Err(plexus_agents::Error::ToolError {
                tool_id: tool_id.to_string(),
                cause: "fixture: enrich step failed".into(),
            });
        }
        let row = serde_json::json!(parameters);
        Ok(plexus_types::ArtifactPayload::new(vec![row], tool_id.to_string()))
    }
}

#[tokio::test]
async fn a_failed_middle_step_skips_its_downstream_dependent() {
    let workspace = TestWorkspace::new();
    let mut options = workspace.run_options();
    options.planner = Some(Box::new(FixedPlanner::three_step_chain()));
    options.invoker = Arc::new(EnrichFailsInvoker);

    let result = plexus_sdk::run(Query::new("fetch, enrich, and summarize ZN futures"), options)
        .await
        .unwrap();

    assert_eq!(result.metadata.total_tasks, 3);
    assert_eq!(result.metadata.successful_tasks, 1);
    assert_eq!(result.metadata.failed_tasks, 2);
    assert!(result.data_by_agent.get("market_data_sql").map(|r| !r.is_empty()).unwrap_or(false));
}

#[tokio::test]
async fn a_cyclic_plan_is_rejected_before_any_task_store_row_is_written() {
    let workspace = TestWorkspace::new();
    let mut options = workspace.run_options();
    options.planner = Some(Box::new(FixedPlanner::cyclic()));

    let result = plexus_sdk::run(Query::new("t1 depends on t2 depends on t1"), options).await;
    assert!(result.is_err());
    match result.unwrap_err() {
        plexus_sdk::Error::Planner(plexus_planner::Error::Graph(_)) => {}
        other => panic!("expected a graph/cycle error, got {other:?}"),
    }

    // Stage 1 rejects the plan before the Task Store is ever opened.
    assert!(!workspace.root().join("orchestrator_results.db").exists());
}

#[tokio::test]
async fn cancelling_before_execution_records_pending_tasks_as_failed_without_publishing_artifacts() {
    let workspace = TestWorkspace::new();
    let mut options = workspace.run_options();
    options.invoker = Arc::new(EchoInvoker);
    options.cancellation_token = Some(Arc::new(AtomicBool::new(true)));

    let result = plexus_sdk::run(Query::new("show all call options"), options)
        .await
        .expect("a cancelled run still returns a partial result, not an error");

    assert_eq!(result.metadata.total_tasks, 1);
    assert_eq!(result.metadata.successful_tasks, 0);
    assert_eq!(result.metadata.failed_tasks, 1);

    let agents_dir = workspace.root().join("agents");
    assert!(!agents_dir.exists() || agents_dir.read_dir().unwrap().next().is_none());
}
