use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use plexus_agents::ToolLoader;
use plexus_artifacts::ArtifactBus;
use plexus_core::WorkspaceLayout;
use plexus_exec::{build_execution_plan, WorkerExecutor};
use plexus_planner::{decompose, plan_stage2};
use plexus_store::Database;
use plexus_types::{generate_run_id, generate_session_id, Query, RunMetadata, RunResult, SessionContext};

use crate::error::Result;
use crate::options::RunOptions;
use crate::runner::consolidate;

/// Runs a single analytical query end to end: Stage 1 decomposition,
/// Stage 2 tool selection, execution, and consolidation.
///
/// The crate's top-level entry point: `run(query, options) -> RunResult`.
pub async fn run(query: Query, mut options: RunOptions) -> Result<RunResult> {
    let started_at = Utc::now();
    let layout = WorkspaceLayout::new(options.config.workspace_root.clone());
    let loader = ToolLoader::new();

    let salt = format!("{}@{}", query.text(), started_at.to_rfc3339());
    let run_id = generate_run_id(started_at, &salt);
    let session_id = options
        .session_id
        .take()
        .unwrap_or_else(|| generate_session_id(started_at, &salt));
    let session = SessionContext::new(run_id.clone(), session_id);

    // A planner collaborator that fails with `PlannerUnavailable` falls
    // back to Stage 1's deterministic single-task plan rather than
    // aborting the run.
    let plan = match decompose(
        options.planner.as_deref(),
        &loader,
        run_id.to_string(),
        query.clone(),
        options.max_subtasks,
    ) {
        Ok(plan) => plan,
        Err(plexus_planner::Error::PlannerUnavailable(_)) if options.planner.is_some() => decompose(
            None,
            &loader,
            run_id.to_string(),
            query.clone(),
            options.max_subtasks,
        )?,
        Err(e) => return Err(e.into()),
    };

    let path_plans = plan_stage2(&plan, &loader, &session)?;
    let execution_plan = build_execution_plan(&plan, &path_plans);

    // Independent of Stage 2's `needs_review` confidence flag: a subtask
    // is unmappable when Stage 1 couldn't route it to any agent at all,
    // regardless of how confident Stage 2 is about anything it did select.
    let unmappable_tasks = plan.subtasks.iter().filter(|s| !s.mappable).count();

    let store = Arc::new(Mutex::new(Database::open(&layout.task_store_db())?));
    let bus = Arc::new(ArtifactBus::new(layout.root().join("agents")));
    let cancel = options
        .cancellation_token
        .take()
        .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));

    let executor = WorkerExecutor::new(
        options.config.max_parallel,
        Duration::from_secs(options.config.task_timeout_secs),
        Duration::from_secs(options.config.dependency_wait_timeout_secs),
    );

    let invoker = options.invoker.clone();
    match options.progress.take() {
        Some(mut callback) => {
            executor
                .run(&run_id, &execution_plan, store.clone(), bus, invoker, cancel, |event| {
                    callback(event)
                })
                .await?;
        }
        None => {
            executor
                .run(&run_id, &execution_plan, store.clone(), bus, invoker, cancel, |_event| {})
                .await?;
        }
    }

    let (summary, outputs) = {
        let db = store.lock().expect("task store lock poisoned");
        (db.get_run_summary(&run_id)?, db.get_all_outputs(&run_id)?)
    };

    let consolidated = consolidate(
        &query,
        outputs,
        options.answer_generator.as_deref(),
        options.validator.as_deref(),
        options.skip_validation,
    )?;

    let finished_at = Utc::now();
    let metadata = RunMetadata {
        started_at,
        duration_ms: (finished_at - started_at).num_milliseconds(),
        // `summary.total_tasks` only counts tasks that got a worker_runs
        // row; unmappable tasks never do, so they're added back in here
        // to preserve plan.subtasks.len() == total_tasks.
        total_tasks: summary.total_tasks + unmappable_tasks,
        successful_tasks: summary.completed,
        // A task skipped because an upstream dependency failed is still a
        // task that did not produce output; count it
        // alongside outright failures rather than as its own bucket.
        failed_tasks: summary.failed + summary.skipped,
        agents_used: summary.agents_used,
        unmappable_tasks,
        script_refs: Vec::new(),
    };

    Ok(RunResult::from_consolidated(run_id, query, consolidated, metadata))
}
