use std::collections::HashMap;

use plexus_types::{PathPlan, Plan};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single task's resolved execution parameters: what tool to call,
/// with what arguments, and which tasks must complete first. Pure data —
/// the Coder only assembles this, it never runs anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionTask {
    pub task_id: String,
    pub agent_id: String,
    pub tool_id: String,
    pub parameters: HashMap<String, Value>,
    pub depends_on: Vec<String>,
    pub needs_review: bool,
    /// `false` when Stage 1 couldn't route this task to any agent. The
    /// task still occupies its place in the execution graph so the
    /// dispatcher can cascade-skip its dependents, but it's never
    /// dispatched to a worker itself.
    pub mappable: bool,
}

/// The flattened, dispatch-ready form of a plan: one [`ExecutionTask`]
/// per subtask, deduplicated across Stage 2's per-path tool selections
/// (a task that appears on more than one path keeps its first
/// selection — Stage 2 plans every path independently but a shared
/// ancestor task is only ever executed once).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub plan_id: String,
    pub tasks: Vec<ExecutionTask>,
}

/// Assembles an [`ExecutionPlan`] from Stage 1's plan and Stage 2's
/// per-path tool selections.
pub fn build_execution_plan(plan: &Plan, path_plans: &[PathPlan]) -> ExecutionPlan {
    let mut seen = std::collections::HashSet::new();
    let mut tasks = Vec::with_capacity(plan.subtasks.len());

    for path_plan in path_plans {
        for task_id in &path_plan.task_ids {
            if !seen.insert(task_id.clone()) {
                continue;
            }
            let subtask = match plan.subtask(task_id) {
                Some(s) => s,
                None => continue,
            };
            let selection = path_plan.tool_selections.get(task_id);
            tasks.push(ExecutionTask {
                task_id: task_id.clone(),
                agent_id: subtask.agent.map(|a| a.id().to_string()).unwrap_or_default(),
                tool_id: selection.map(|s| s.tool_id.clone()).unwrap_or_default(),
                parameters: selection.map(|s| s.parameters.clone()).unwrap_or_default(),
                depends_on: subtask.depends_on.clone(),
                needs_review: selection.map(|s| s.needs_review).unwrap_or(true),
                mappable: subtask.mappable,
            });
        }
    }

    ExecutionPlan {
        plan_id: plan.plan_id.clone(),
        tasks,
    }
}
