use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RunId;

/// Lifecycle state of a single worker's execution of one task, tracked in
/// the `worker_runs` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

/// A row in the `worker_runs` table: one (run_id, task_id) execution
/// record, keyed durably so a crashed run can be inspected or replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRunRecord {
    pub run_id: RunId,
    pub task_id: String,
    pub agent: String,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration of the task's execution, set when it reaches
    /// `Completed`. `None` for tasks that never ran to completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    /// Location of the task's published output in the Artifact Bus, set
    /// alongside `duration_ms` on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_ref: Option<String>,
}

/// A row in the `task_outputs` table: the payload a task produced, stored
/// separately from `worker_runs` so large outputs don't bloat the status
/// query path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutputRecord {
    pub run_id: RunId,
    pub task_id: String,
    pub output: serde_json::Value,
    pub produced_at: DateTime<Utc>,
}

/// Aggregate view over a run's `worker_runs` rows, used by the CLI's
/// `replay` subcommand and by the Runner's consolidation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub total_tasks: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub running: usize,
    /// Distinct agent ids that were actually dispatched, sorted.
    pub agents_used: Vec<String>,
    /// Wall-clock duration in milliseconds of every completed task.
    pub durations: Vec<i64>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.completed + self.failed + self.skipped >= self.total_tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Skipped.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }

    #[test]
    fn run_summary_completeness() {
        let summary = RunSummary {
            run_id: RunId::new("20260728143000_abcdef"),
            total_tasks: 3,
            completed: 2,
            failed: 1,
            skipped: 0,
            running: 0,
            agents_used: vec!["analytics".to_string()],
            durations: vec![120, 340],
        };
        assert!(summary.is_complete());
    }
}
