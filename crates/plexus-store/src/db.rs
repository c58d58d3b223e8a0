use std::path::Path;

use chrono::Utc;
use plexus_types::{RunId, RunSummary, TaskOutputRecord, TaskStatus, WorkerRunRecord};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};

/// Durable record of every task's execution lifecycle and output,
/// backed by SQLite so a crashed run can be inspected or resumed.
///
/// Two tables: `worker_runs` tracks status transitions, `task_outputs`
/// holds the (potentially large) payload separately so status queries
/// stay cheap.
pub struct Database {
    conn: Connection,
}

fn status_to_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Running => "running",
        TaskStatus::Completed => "completed",
        TaskStatus::Failed => "failed",
        TaskStatus::Skipped => "skipped",
    }
}

fn status_from_str(raw: &str) -> TaskStatus {
    match raw {
        "running" => TaskStatus::Running,
        "completed" => TaskStatus::Completed,
        "failed" => TaskStatus::Failed,
        "skipped" => TaskStatus::Skipped,
        _ => TaskStatus::Pending,
    }
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS worker_runs (
                run_id TEXT NOT NULL,
                task_id TEXT NOT NULL,
                agent TEXT NOT NULL,
                status TEXT NOT NULL,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                error TEXT,
                duration_ms INTEGER,
                artifact_ref TEXT,
                PRIMARY KEY (run_id, task_id)
            );

            CREATE TABLE IF NOT EXISTS task_outputs (
                run_id TEXT NOT NULL,
                task_id TEXT NOT NULL,
                output TEXT NOT NULL,
                produced_at TEXT NOT NULL,
                PRIMARY KEY (run_id, task_id)
            );

            CREATE INDEX IF NOT EXISTS idx_worker_runs_run ON worker_runs(run_id);
            CREATE INDEX IF NOT EXISTS idx_task_outputs_run ON task_outputs(run_id);
            "#,
        )?;
        Ok(())
    }

    /// Records a task entering `Running` state. Fails if a non-terminal
    /// run already exists for this `(run_id, task_id)`.
    pub fn start_task(&self, run_id: &RunId, task_id: &str, agent: &str) -> Result<()> {
        if let Some(existing) = self.task_status(run_id, task_id)? {
            if !existing.is_terminal() {
                return Err(Error::AlreadyStarted {
                    run_id: run_id.to_string(),
                    task_id: task_id.to_string(),
                });
            }
        }
        self.conn.execute(
            r#"
            INSERT INTO worker_runs (run_id, task_id, agent, status, started_at, completed_at, error, duration_ms, artifact_ref)
            VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL, NULL, NULL)
            ON CONFLICT(run_id, task_id) DO UPDATE SET
                agent = ?3,
                status = ?4,
                started_at = ?5,
                completed_at = NULL,
                error = NULL,
                duration_ms = NULL,
                artifact_ref = NULL
            "#,
            params![
                run_id.as_str(),
                task_id,
                agent,
                status_to_str(TaskStatus::Running),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Marks a task `Completed`, recording how long it ran and where its
    /// output landed in the Artifact Bus. Must be called before
    /// `store_output` is considered durable for this task: a crash
    /// between the two would leave an orphan `task_outputs` row with no
    /// corresponding successful `worker_runs` row.
    pub fn complete_task(&self, run_id: &RunId, task_id: &str, duration_ms: i64, artifact_ref: &str) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE worker_runs SET status = ?1, completed_at = ?2, duration_ms = ?3, artifact_ref = ?4
            WHERE run_id = ?5 AND task_id = ?6
            "#,
            params![
                status_to_str(TaskStatus::Completed),
                Utc::now().to_rfc3339(),
                duration_ms,
                artifact_ref,
                run_id.as_str(),
                task_id,
            ],
        )?;
        Ok(())
    }

    /// Marks a task `Failed`. Upserts rather than updates: a cancelled
    /// run fails tasks that never got as far as `start_task`, so no row
    /// may yet exist for this `(run_id, task_id)`.
    pub fn fail_task(&self, run_id: &RunId, task_id: &str, agent: &str, error: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO worker_runs (run_id, task_id, agent, status, started_at, completed_at, error, duration_ms, artifact_ref)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, NULL, NULL)
            ON CONFLICT(run_id, task_id) DO UPDATE SET
                status = ?4,
                completed_at = ?5,
                error = ?6
            "#,
            params![
                run_id.as_str(),
                task_id,
                agent,
                status_to_str(TaskStatus::Failed),
                Utc::now().to_rfc3339(),
                error,
            ],
        )?;
        Ok(())
    }

    /// Marks a task as skipped because an upstream dependency failed (or
    /// because it was never mappable to an agent). The task may never
    /// have had a `worker_runs` row (it was never dispatched), so this
    /// upserts rather than updates.
    pub fn skip_task(&self, run_id: &RunId, task_id: &str, agent: &str, reason: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO worker_runs (run_id, task_id, agent, status, started_at, completed_at, error, duration_ms, artifact_ref)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, NULL, NULL)
            ON CONFLICT(run_id, task_id) DO UPDATE SET
                status = ?4,
                completed_at = ?5,
                error = ?6
            "#,
            params![
                run_id.as_str(),
                task_id,
                agent,
                status_to_str(TaskStatus::Skipped),
                Utc::now().to_rfc3339(),
                reason,
            ],
        )?;
        Ok(())
    }

    pub fn store_output(&self, run_id: &RunId, task_id: &str, output: &serde_json::Value) -> Result<()> {
        let serialized = serde_json::to_string(output)?;
        self.conn.execute(
            r#"
            INSERT INTO task_outputs (run_id, task_id, output, produced_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(run_id, task_id) DO UPDATE SET
                output = ?3,
                produced_at = ?4
            "#,
            params![run_id.as_str(), task_id, serialized, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn get_output(&self, run_id: &RunId, task_id: &str) -> Result<Option<TaskOutputRecord>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT output, produced_at FROM task_outputs
                WHERE run_id = ?1 AND task_id = ?2
                "#,
                params![run_id.as_str(), task_id],
                |row| {
                    let raw: String = row.get(0)?;
                    let produced_at: String = row.get(1)?;
                    Ok((raw, produced_at))
                },
            )
            .optional()?;

        match result {
            Some((raw, produced_at)) => Ok(Some(TaskOutputRecord {
                run_id: run_id.clone(),
                task_id: task_id.to_string(),
                output: serde_json::from_str(&raw)?,
                produced_at: chrono::DateTime::parse_from_rfc3339(&produced_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })),
            None => Ok(None),
        }
    }

    /// Every successful task's output for `run_id`, joined against
    /// `worker_runs` for the owning agent id. Used by the Runner to
    /// bucket outputs by agent when consolidating a finished run.
    pub fn get_all_outputs(&self, run_id: &RunId) -> Result<Vec<(String, TaskOutputRecord)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT w.agent, o.task_id, o.output, o.produced_at
            FROM task_outputs o
            JOIN worker_runs w ON w.run_id = o.run_id AND w.task_id = o.task_id
            WHERE o.run_id = ?1
            ORDER BY o.task_id
            "#,
        )?;
        let rows = stmt
            .query_map(params![run_id.as_str()], |row| {
                let agent: String = row.get(0)?;
                let task_id: String = row.get(1)?;
                let raw: String = row.get(2)?;
                let produced_at: String = row.get(3)?;
                Ok((agent, task_id, raw, produced_at))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut results = Vec::with_capacity(rows.len());
        for (agent, task_id, raw, produced_at) in rows {
            results.push((
                agent,
                TaskOutputRecord {
                    run_id: run_id.clone(),
                    task_id,
                    output: serde_json::from_str(&raw)?,
                    produced_at: chrono::DateTime::parse_from_rfc3339(&produced_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                },
            ));
        }
        Ok(results)
    }

    fn task_status(&self, run_id: &RunId, task_id: &str) -> Result<Option<TaskStatus>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM worker_runs WHERE run_id = ?1 AND task_id = ?2",
                params![run_id.as_str(), task_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(raw.map(|s| status_from_str(&s)))
    }

    /// True if every id in `dep_ids` has a `Completed` row for this run.
    pub fn are_dependencies_complete(&self, run_id: &RunId, dep_ids: &[String]) -> Result<bool> {
        for dep in dep_ids {
            match self.task_status(run_id, dep)? {
                Some(TaskStatus::Completed) => continue,
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    pub fn worker_run(&self, run_id: &RunId, task_id: &str) -> Result<Option<WorkerRunRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT agent, status, started_at, completed_at, error, duration_ms, artifact_ref
                FROM worker_runs WHERE run_id = ?1 AND task_id = ?2
                "#,
                params![run_id.as_str(), task_id],
                |row| {
                    let agent: String = row.get(0)?;
                    let status: String = row.get(1)?;
                    let started_at: String = row.get(2)?;
                    let completed_at: Option<String> = row.get(3)?;
                    let error: Option<String> = row.get(4)?;
                    let duration_ms: Option<i64> = row.get(5)?;
                    let artifact_ref: Option<String> = row.get(6)?;
                    Ok((agent, status, started_at, completed_at, error, duration_ms, artifact_ref))
                },
            )
            .optional()?;

        Ok(row.map(|(agent, status, started_at, completed_at, error, duration_ms, artifact_ref)| WorkerRunRecord {
            run_id: run_id.clone(),
            task_id: task_id.to_string(),
            agent,
            status: status_from_str(&status),
            started_at: chrono::DateTime::parse_from_rfc3339(&started_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            completed_at: completed_at.and_then(|s| {
                chrono::DateTime::parse_from_rfc3339(&s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }),
            error,
            duration_ms,
            artifact_ref,
        }))
    }

    pub fn get_run_summary(&self, run_id: &RunId) -> Result<RunSummary> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, agent, duration_ms FROM worker_runs WHERE run_id = ?1")?;
        let rows: Vec<(String, String, Option<i64>)> = stmt
            .query_map(params![run_id.as_str()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut completed = 0;
        let mut failed = 0;
        let mut skipped = 0;
        let mut running = 0;
        let mut agents_used: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
        let mut durations = Vec::new();
        for (raw_status, agent, duration_ms) in &rows {
            match status_from_str(raw_status) {
                TaskStatus::Completed => {
                    completed += 1;
                    agents_used.insert(agent.clone());
                    if let Some(ms) = duration_ms {
                        durations.push(*ms);
                    }
                }
                TaskStatus::Failed => {
                    failed += 1;
                    agents_used.insert(agent.clone());
                }
                TaskStatus::Skipped => skipped += 1,
                TaskStatus::Running => {
                    running += 1;
                    agents_used.insert(agent.clone());
                }
                TaskStatus::Pending => {}
            }
        }

        Ok(RunSummary {
            run_id: run_id.clone(),
            total_tasks: rows.len(),
            completed,
            failed,
            skipped,
            running,
            agents_used: agents_used.into_iter().collect(),
            durations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_id() -> RunId {
        RunId::new("20260728143000_abcdef")
    }

    #[test]
    fn start_then_complete_task() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.start_task(&rid, "t1", "market_data_sql").unwrap();
        db.complete_task(&rid, "t1", 10, "agents/market_data_sql/000001.json").unwrap();

        let record = db.worker_run(&rid, "t1").unwrap().unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
    }

    #[test]
    fn complete_task_records_duration_and_artifact_ref() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.start_task(&rid, "t1", "market_data_sql").unwrap();
        db.complete_task(&rid, "t1", 42, "agents/market_data_sql/000001.json").unwrap();

        let record = db.worker_run(&rid, "t1").unwrap().unwrap();
        assert_eq!(record.duration_ms, Some(42));
        assert_eq!(record.artifact_ref.as_deref(), Some("agents/market_data_sql/000001.json"));
    }

    #[test]
    fn fail_task_upserts_a_never_started_task() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.fail_task(&rid, "t1", "unknown", "cancelled").unwrap();

        let record = db.worker_run(&rid, "t1").unwrap().unwrap();
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("cancelled"));
    }

    #[test]
    fn starting_a_running_task_twice_fails() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.start_task(&rid, "t1", "market_data_sql").unwrap();
        let result = db.start_task(&rid, "t1", "market_data_sql");
        assert!(result.is_err());
    }

    #[test]
    fn restarting_a_failed_task_is_allowed() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.start_task(&rid, "t1", "market_data_sql").unwrap();
        db.fail_task(&rid, "t1", "market_data_sql", "boom").unwrap();
        assert!(db.start_task(&rid, "t1", "market_data_sql").is_ok());
    }

    #[test]
    fn dependencies_complete_tracks_all_deps() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.start_task(&rid, "a", "analytics").unwrap();
        db.complete_task(&rid, "a", 5, "agents/analytics/000001.json").unwrap();
        db.start_task(&rid, "b", "analytics").unwrap();

        assert!(db.are_dependencies_complete(&rid, &["a".to_string()]).unwrap());
        assert!(!db
            .are_dependencies_complete(&rid, &["a".to_string(), "b".to_string()])
            .unwrap());
    }

    #[test]
    fn store_and_get_output_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        let payload = serde_json::json!({"price": 101.25});
        db.store_output(&rid, "t1", &payload).unwrap();

        let record = db.get_output(&rid, "t1").unwrap().unwrap();
        assert_eq!(record.output, payload);
    }

    #[test]
    fn get_all_outputs_joins_agent_from_worker_runs() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.start_task(&rid, "a", "market_data_sql").unwrap();
        db.store_output(&rid, "a", &serde_json::json!({"price": 101.5})).unwrap();
        db.complete_task(&rid, "a", 5, "agents/market_data_sql/000001.json").unwrap();
        db.start_task(&rid, "b", "analytics").unwrap();
        db.store_output(&rid, "b", &serde_json::json!({"avg": 100.0})).unwrap();
        db.complete_task(&rid, "b", 5, "agents/analytics/000001.json").unwrap();

        let outputs = db.get_all_outputs(&rid).unwrap();
        assert_eq!(outputs.len(), 2);
        let agents: Vec<&str> = outputs.iter().map(|(agent, _)| agent.as_str()).collect();
        assert!(agents.contains(&"market_data_sql"));
        assert!(agents.contains(&"analytics"));
    }

    #[test]
    fn run_summary_counts_by_status() {
        let db = Database::open_in_memory().unwrap();
        let rid = run_id();
        db.start_task(&rid, "a", "analytics").unwrap();
        db.complete_task(&rid, "a", 15, "agents/analytics/000001.json").unwrap();
        db.start_task(&rid, "b", "analytics").unwrap();
        db.fail_task(&rid, "b", "analytics", "boom").unwrap();
        db.skip_task(&rid, "c", "analytics", "upstream failed").unwrap();
        db.start_task(&rid, "d", "market_data_sql").unwrap();

        let summary = db.get_run_summary(&rid).unwrap();
        assert_eq!(summary.total_tasks, 4);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.running, 1);
        assert_eq!(summary.agents_used, vec!["analytics".to_string(), "market_data_sql".to_string()]);
        assert_eq!(summary.durations, vec![15]);
    }
}
