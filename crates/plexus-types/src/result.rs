use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::RunId;
use crate::subtask::Query;

/// Per-agent rollup the Runner computes while consolidating task outputs:
/// how many outputs that agent produced and simple numeric summary stats
/// over any numeric fields found in them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub output_count: usize,
    pub summary_stats: HashMap<String, f64>,
}

/// Outcome of an optional validator collaborator pass over the
/// consolidated result, before it's returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub completeness_score: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// The Runner's consolidated view of a completed run: every agent's raw
/// outputs bucketed by agent id, a per-agent summary, and the synthesized
/// answer text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedResult {
    pub answer_text: String,
    pub data_by_agent: HashMap<String, Vec<serde_json::Value>>,
    pub agent_summaries: Vec<AgentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl ConsolidatedResult {
    pub fn summary_for(&self, agent_id: &str) -> Option<&AgentSummary> {
        self.agent_summaries.iter().find(|s| s.agent_id == agent_id)
    }
}

/// Run-level bookkeeping returned alongside the consolidated answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub total_tasks: usize,
    pub successful_tasks: usize,
    pub failed_tasks: usize,
    pub agents_used: Vec<String>,
    pub unmappable_tasks: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script_refs: Vec<String>,
}

/// Top-level result returned from `plexus_sdk::run`: the consolidated
/// answer plus the run metadata needed to look the run up again later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub query: Query,
    pub answer_text: String,
    pub data_by_agent: HashMap<String, Vec<serde_json::Value>>,
    pub agent_summaries: Vec<AgentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    pub metadata: RunMetadata,
}

impl RunResult {
    pub fn from_consolidated(
        run_id: RunId,
        query: Query,
        consolidated: ConsolidatedResult,
        metadata: RunMetadata,
    ) -> Self {
        Self {
            run_id,
            query,
            answer_text: consolidated.answer_text,
            data_by_agent: consolidated.data_by_agent,
            agent_summaries: consolidated.agent_summaries,
            validation: consolidated.validation,
            metadata,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.metadata.failed_tasks == 0
    }
}
