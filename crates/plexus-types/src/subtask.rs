use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::agent::AgentKind;

/// A raw natural-language analytical query as submitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

/// A single unit of work produced by Stage 1: decomposition assigns each
/// subtask a normalized id, a natural-language description, an agent
/// kind, and the set of task ids it depends on.
///
/// `agent` is `None` when no agent in the registry scored above zero
/// against the description: the task still occupies a place in the DAG
/// (so downstream dependents resolve correctly) but `mappable` is
/// `false` and the executor skips dispatching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub task_id: String,
    pub description: String,
    pub agent: Option<AgentKind>,
    pub mappable: bool,
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script_refs: Vec<String>,
}

/// Stage 1's output: a validated, closed-over set of subtasks forming a
/// DAG. `plan_id` ties this plan back to the run that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: String,
    pub query: Query,
    pub subtasks: Vec<Subtask>,
}

impl Plan {
    pub fn subtask(&self, task_id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.task_id == task_id)
    }

    pub fn is_empty(&self) -> bool {
        self.subtasks.is_empty()
    }
}

/// A single extracted tool call: which tool, with what parameters,
/// produced by Stage 2 for one task on one dependency path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSelection {
    pub tool_id: String,
    pub parameters: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub needs_review: bool,
}

/// Stage 2's output for a single leaf-to-root dependency path: the chain
/// of task ids the path covers, plus the tool selection made for each
/// task along it. Paths are planned in isolation so that one path's
/// context never leaks into another's parameter extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPlan {
    pub path_id: String,
    pub task_ids: Vec<String>,
    pub tool_selections: HashMap<String, ToolSelection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> Plan {
        Plan {
            plan_id: "plan-1".into(),
            query: Query::new("what is the closing price of ZN"),
            subtasks: vec![Subtask {
                task_id: "t1".into(),
                description: "fetch ZN closing price".into(),
                agent: Some(AgentKind::MarketDataSql),
                mappable: true,
                depends_on: vec![],
                script_refs: vec![],
            }],
        }
    }

    #[test]
    fn plan_subtask_lookup() {
        let plan = sample_plan();
        assert!(plan.subtask("t1").is_some());
        assert!(plan.subtask("missing").is_none());
        assert!(!plan.is_empty());
    }
}
