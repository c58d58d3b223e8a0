use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use plexus_agents::AgentInvoker;
use plexus_artifacts::ArtifactBus;
use plexus_store::Database;
use plexus_types::{ArtifactPayload, RunId};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::coder::{ExecutionPlan, ExecutionTask};
use crate::error::{Error, Result};

/// Progress callbacks the executor fires as tasks move through their
/// lifecycle. Mirrors the shape the CLI and SDK render to a terminal or
/// log stream.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    TaskStarted(String),
    TaskCompleted(String),
    TaskFailed(String, String),
    TaskSkipped(String, String),
}

enum TaskOutcome {
    Completed,
    Failed(String),
}

/// Dependency-aware parallel dispatcher: runs an [`ExecutionPlan`]'s
/// tasks against a shared [`Database`] and [`ArtifactBus`], bounding
/// concurrency with a semaphore and respecting upstream-failure-skip
/// semantics — a task whose dependency failed is never dispatched, and
/// neither are that task's own downstream dependents.
pub struct WorkerExecutor {
    max_parallel: usize,
    task_timeout: Duration,
    dependency_wait_timeout: Duration,
}

impl WorkerExecutor {
    pub fn new(max_parallel: usize, task_timeout: Duration, dependency_wait_timeout: Duration) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
            task_timeout,
            dependency_wait_timeout,
        }
    }

    pub async fn run<F>(
        &self,
        run_id: &RunId,
        plan: &ExecutionPlan,
        store: Arc<Mutex<Database>>,
        bus: Arc<ArtifactBus>,
        invoker: Arc<dyn AgentInvoker>,
        cancel: Arc<AtomicBool>,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        let task_map: HashMap<String, ExecutionTask> = plan
            .tasks
            .iter()
            .map(|t| (t.task_id.clone(), t.clone()))
            .collect();

        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        let mut indegree: HashMap<String, usize> = HashMap::new();
        for task in &plan.tasks {
            dependents.entry(task.task_id.clone()).or_default();
            indegree.insert(task.task_id.clone(), task.depends_on.len());
            for dep in &task.depends_on {
                dependents.entry(dep.clone()).or_default().push(task.task_id.clone());
            }
        }

        let total = task_map.len();
        let mut terminal: HashSet<String> = HashSet::new();

        // Tasks Stage 1 couldn't route to any agent never get dispatched
        // and never get a worker_runs row of their own — they were never
        // scheduled to run anywhere. Their dependents are still
        // cascade-skipped, the same as an upstream failure, since no
        // output will ever arrive for them to consume.
        for task in &plan.tasks {
            if terminal.contains(&task.task_id) || task.mappable {
                continue;
            }
            terminal.insert(task.task_id.clone());
            on_progress(ProgressEvent::TaskSkipped(
                task.task_id.clone(),
                "no agent could be routed for this task".to_string(),
            ));
            self.skip_downstream_with_reason(
                &task.task_id,
                "could not be mapped to an agent",
                &dependents,
                &mut terminal,
                &store,
                run_id,
                &mut on_progress,
            );
        }

        // Stable ordering: iterate the plan's ordinal order rather than
        // the indegree map's (randomized) iteration order, so two runs of
        // the same plan dispatch their first layer identically.
        let mut ready: VecDeque<String> = plan
            .tasks
            .iter()
            .map(|t| t.task_id.clone())
            .filter(|id| !terminal.contains(id))
            .filter(|id| indegree.get(id).copied().unwrap_or(0) == 0)
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut join_set: JoinSet<(String, TaskOutcome)> = JoinSet::new();
        let mut in_flight = 0usize;

        while terminal.len() < total {
            if cancel.load(Ordering::Relaxed) {
                join_set.abort_all();
                let cancelled: Vec<String> = plan
                    .tasks
                    .iter()
                    .map(|t| t.task_id.clone())
                    .filter(|id| !terminal.contains(id))
                    .collect();
                for task_id in cancelled {
                    terminal.insert(task_id.clone());
                    let task = task_map.get(&task_id).expect("plan task id came from the plan");
                    if let Ok(db) = store.lock() {
                        let _ = db.fail_task(run_id, &task_id, &task.agent_id, "cancelled");
                    }
                    on_progress(ProgressEvent::TaskFailed(task_id, "cancelled".to_string()));
                }
                break;
            }

            while let Some(task_id) = ready.pop_front() {
                if terminal.contains(&task_id) {
                    continue;
                }
                let task = task_map
                    .get(&task_id)
                    .expect("ready task id came from the plan")
                    .clone();
                let permit = semaphore.clone();
                let store = store.clone();
                let bus = bus.clone();
                let invoker = invoker.clone();
                let run_id = run_id.clone();
                let timeout = self.task_timeout;

                on_progress(ProgressEvent::TaskStarted(task_id.clone()));
                join_set.spawn(async move {
                    let _permit = permit.acquire_owned().await.expect("executor semaphore closed");
                    let outcome = execute_one(&run_id, &task, &store, &bus, &invoker, timeout).await;
                    (task.task_id.clone(), outcome)
                });
                in_flight += 1;
            }

            if in_flight == 0 {
                break;
            }

            let next = tokio::time::timeout(self.dependency_wait_timeout, join_set.join_next()).await;
            match next {
                Ok(Some(Ok((task_id, outcome)))) => {
                    in_flight -= 1;
                    terminal.insert(task_id.clone());
                    match outcome {
                        TaskOutcome::Completed => {
                            on_progress(ProgressEvent::TaskCompleted(task_id.clone()));
                            for dep in dependents.get(&task_id).cloned().unwrap_or_default() {
                                if terminal.contains(&dep) {
                                    continue;
                                }
                                if let Some(deg) = indegree.get_mut(&dep) {
                                    *deg = deg.saturating_sub(1);
                                    if *deg == 0 {
                                        ready.push_back(dep);
                                    }
                                }
                            }
                        }
                        TaskOutcome::Failed(err) => {
                            on_progress(ProgressEvent::TaskFailed(task_id.clone(), err));
                            self.skip_downstream_with_reason(
                                &task_id,
                                "failed",
                                &dependents,
                                &mut terminal,
                                &store,
                                run_id,
                                &mut on_progress,
                            );
                        }
                    }
                }
                Ok(Some(Err(join_err))) => {
                    return Err(Error::Agents(plexus_agents::Error::ToolError {
                        tool_id: "executor".to_string(),
                        cause: join_err.to_string(),
                    }));
                }
                Ok(None) => break,
                Err(_elapsed) => {
                    return Err(Error::Timeout(
                        "dependency wait timeout exceeded while waiting for in-flight tasks".into(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Cascades a skip to every transitive dependent of `upstream_task_id`,
    /// since none of them can ever see that task's output. `cause`
    /// completes "upstream task '{id}' {cause}" for the recorded reason —
    /// `"failed"` for a genuine failure, `"could not be mapped to an
    /// agent"` for an unmappable task.
    fn skip_downstream_with_reason<F>(
        &self,
        upstream_task_id: &str,
        cause: &str,
        dependents: &HashMap<String, Vec<String>>,
        terminal: &mut HashSet<String>,
        store: &Arc<Mutex<Database>>,
        run_id: &RunId,
        on_progress: &mut F,
    ) where
        F: FnMut(ProgressEvent) + Send,
    {
        let mut queue: VecDeque<String> = dependents
            .get(upstream_task_id)
            .cloned()
            .unwrap_or_default()
            .into();

        while let Some(task_id) = queue.pop_front() {
            if terminal.contains(&task_id) {
                continue;
            }
            terminal.insert(task_id.clone());
            let reason = format!("upstream task '{}' {}", upstream_task_id, cause);
            if let Ok(db) = store.lock() {
                let _ = db.skip_task(run_id, &task_id, "unknown", &reason);
            }
            on_progress(ProgressEvent::TaskSkipped(task_id.clone(), reason));
            if let Some(further) = dependents.get(&task_id) {
                queue.extend(further.iter().cloned());
            }
        }
    }
}

async fn execute_one(
    run_id: &RunId,
    task: &ExecutionTask,
    store: &Arc<Mutex<Database>>,
    bus: &Arc<ArtifactBus>,
    invoker: &Arc<dyn AgentInvoker>,
    timeout: Duration,
) -> TaskOutcome {
    let started = std::time::Instant::now();
    {
        let db = store.lock().expect("task store lock poisoned");
        if let Err(e) = db.start_task(run_id, &task.task_id, &task.agent_id) {
            return TaskOutcome::Failed(e.to_string());
        }
    }

    let invoker = invoker.clone();
    let tool_id = task.tool_id.clone();
    let parameters = task.parameters.clone();
    let invocation = tokio::task::spawn_blocking(move || invoker.invoke(&tool_id, &parameters));

    let payload: ArtifactPayload = match tokio::time::timeout(timeout, invocation).await {
        Ok(Ok(Ok(payload))) => payload,
        Ok(Ok(Err(e))) => {
            let db = store.lock().expect("task store lock poisoned");
            let _ = db.fail_task(run_id, &task.task_id, &task.agent_id, &e.to_string());
            return TaskOutcome::Failed(e.to_string());
        }
        Ok(Err(join_err)) => {
            let db = store.lock().expect("task store lock poisoned");
            let _ = db.fail_task(run_id, &task.task_id, &task.agent_id, &join_err.to_string());
            return TaskOutcome::Failed(join_err.to_string());
        }
        Err(_elapsed) => {
            let message = format!("task '{}' exceeded its timeout", task.task_id);
            let db = store.lock().expect("task store lock poisoned");
            let _ = db.fail_task(run_id, &task.task_id, &task.agent_id, &message);
            return TaskOutcome::Failed(message);
        }
    };

    let artifact = match bus.publish(&task.agent_id, payload.clone()) {
        Ok(artifact) => artifact,
        Err(e) => {
            let db = store.lock().expect("task store lock poisoned");
            let _ = db.fail_task(run_id, &task.task_id, &task.agent_id, &e.to_string());
            return TaskOutcome::Failed(e.to_string());
        }
    };

    let duration_ms = started.elapsed().as_millis() as i64;
    let artifact_ref = format!("{}/{}.json", task.agent_id, artifact.sequence);

    let db = store.lock().expect("task store lock poisoned");
    // complete_task must land before store_output: a crash between the
    // two should never leave a task_outputs row with no corresponding
    // successful worker_runs row.
    if let Err(e) = db.complete_task(run_id, &task.task_id, duration_ms, &artifact_ref) {
        return TaskOutcome::Failed(e.to_string());
    }
    if let Err(e) = db.store_output(run_id, &task.task_id, &serde_json::json!(payload)) {
        return TaskOutcome::Failed(e.to_string());
    }

    TaskOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_agents::EchoInvoker;
    use std::sync::atomic::AtomicBool;

    fn run_id() -> RunId {
        RunId::new("20260728143000_abcdef")
    }

    #[tokio::test]
    async fn dispatches_a_linear_chain_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let bus = Arc::new(ArtifactBus::new(dir.path()));
        let invoker: Arc<dyn AgentInvoker> = Arc::new(EchoInvoker);
        let executor = WorkerExecutor::new(2, Duration::from_secs(5), Duration::from_secs(5));

        let plan = ExecutionPlan {
            plan_id: "p1".into(),
            tasks: vec![
                ExecutionTask {
                    task_id: "a".into(),
                    agent_id: "market_data_sql".into(),
                    tool_id: "market_data_sql.query".into(),
                    parameters: HashMap::new(),
                    depends_on: vec![],
                    needs_review: false,
                    mappable: true,
                },
                ExecutionTask {
                    task_id: "b".into(),
                    agent_id: "analytics".into(),
                    tool_id: "analytics.compute".into(),
                    parameters: HashMap::new(),
                    depends_on: vec!["a".into()],
                    needs_review: false,
                    mappable: true,
                },
            ],
        };

        let rid = run_id();
        let mut events = Vec::new();
        executor
            .run(
                &rid,
                &plan,
                store.clone(),
                bus,
                invoker,
                Arc::new(AtomicBool::new(false)),
                |event| events.push(event),
            )
            .await
            .unwrap();

        let summary = store.lock().unwrap().get_run_summary(&rid).unwrap();
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn unmappable_task_is_skipped_and_cascades_to_its_dependent() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let bus = Arc::new(ArtifactBus::new(dir.path()));
        let invoker: Arc<dyn AgentInvoker> = Arc::new(EchoInvoker);
        let executor = WorkerExecutor::new(2, Duration::from_secs(5), Duration::from_secs(5));

        let plan = ExecutionPlan {
            plan_id: "p1".into(),
            tasks: vec![
                ExecutionTask {
                    task_id: "mystery".into(),
                    agent_id: "".into(),
                    tool_id: "".into(),
                    parameters: HashMap::new(),
                    depends_on: vec![],
                    needs_review: true,
                    mappable: false,
                },
                ExecutionTask {
                    task_id: "downstream".into(),
                    agent_id: "analytics".into(),
                    tool_id: "analytics.compute".into(),
                    parameters: HashMap::new(),
                    depends_on: vec!["mystery".into()],
                    needs_review: false,
                    mappable: true,
                },
            ],
        };

        let rid = run_id();
        let mut events = Vec::new();
        executor
            .run(
                &rid,
                &plan,
                store.clone(),
                bus,
                invoker,
                Arc::new(AtomicBool::new(false)),
                |event| events.push(event),
            )
            .await
            .unwrap();

        let summary = store.lock().unwrap().get_run_summary(&rid).unwrap();
        assert_eq!(summary.completed, 0);
        // "mystery" itself never gets a worker_runs row — it was never
        // dispatchable to begin with — only its cascade-skipped dependent.
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_tasks, 1);
    }

    #[tokio::test]
    async fn cancellation_fails_pending_tasks_and_returns_a_partial_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
        let bus = Arc::new(ArtifactBus::new(dir.path()));
        let invoker: Arc<dyn AgentInvoker> = Arc::new(EchoInvoker);
        let executor = WorkerExecutor::new(2, Duration::from_secs(5), Duration::from_secs(5));

        let plan = ExecutionPlan {
            plan_id: "p1".into(),
            tasks: vec![ExecutionTask {
                task_id: "a".into(),
                agent_id: "market_data_sql".into(),
                tool_id: "market_data_sql.query".into(),
                parameters: HashMap::new(),
                depends_on: vec![],
                needs_review: false,
                mappable: true,
            }],
        };

        let rid = run_id();
        let mut events = Vec::new();
        let result = executor
            .run(
                &rid,
                &plan,
                store.clone(),
                bus,
                invoker,
                Arc::new(AtomicBool::new(true)),
                |event| events.push(event),
            )
            .await;

        assert!(result.is_ok());
        let summary = store.lock().unwrap().get_run_summary(&rid).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.running, 0);
        let record = store.lock().unwrap().worker_run(&rid, "a").unwrap().unwrap();
        assert_eq!(record.status, plexus_types::TaskStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("cancelled"));
    }
}
