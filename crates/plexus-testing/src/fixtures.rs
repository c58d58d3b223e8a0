//! Mock collaborators for exercising `plexus_sdk::run` without a real
//! LLM or external data backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use plexus_agents::AgentInvoker;
use plexus_planner::{DraftTask, Planner};
use plexus_sdk::{AnswerGenerator, Validator};
use plexus_types::{AgentDescriptor, AgentSummary, ArtifactPayload, Query, ValidationResult};
use serde_json::Value;

/// A [`Planner`] that returns a fixed, hand-authored draft task list
/// regardless of the query text — useful for exercising Stage 1's agent
/// mapping and dependency validation without an LLM.
pub struct FixedPlanner {
    drafts: Vec<DraftTask>,
}

impl FixedPlanner {
    pub fn new(drafts: Vec<DraftTask>) -> Self {
        Self { drafts }
    }

    /// A two-step chain: fetch a market-data row, then compute a derived
    /// analytics value from it.
    pub fn two_step_chain() -> Self {
        Self::new(vec![
            DraftTask {
                task_id: "fetch".into(),
                description: "fetch the closing price of ZN futures".into(),
                depends_on: vec![],
            },
            DraftTask {
                task_id: "analyze".into(),
                description: "compute the daily return from the fetched price".into(),
                depends_on: vec!["fetch".into()],
            },
        ])
    }

    /// A three-step chain whose middle step is expected to fail in the
    /// test (the invoker scripts the failure); the third step should be
    /// skipped with an upstream-failure cause.
    pub fn three_step_chain() -> Self {
        Self::new(vec![
            DraftTask { task_id: "fetch".into(), description: "fetch the closing price of ZN futures".into(), depends_on: vec![] },
            DraftTask { task_id: "enrich".into(), description: "compute the daily return from the fetched price".into(), depends_on: vec!["fetch".into()] },
            DraftTask { task_id: "summarize".into(), description: "summarize the computed return".into(), depends_on: vec!["enrich".into()] },
        ])
    }

    /// Two independent tasks with no shared dependency.
    pub fn two_independent_tasks() -> Self {
        Self::new(vec![
            DraftTask {
                task_id: "prediction".into(),
                description: "search prediction markets for bitcoin odds".into(),
                depends_on: vec![],
            },
            DraftTask {
                task_id: "market".into(),
                description: "fetch bitcoin market data".into(),
                depends_on: vec![],
            },
        ])
    }

    /// A self-referential cycle `t1 -> t2 -> t1`, for exercising
    /// Dependency Analyzer rejection.
    pub fn cyclic() -> Self {
        Self::new(vec![
            DraftTask { task_id: "t1".into(), description: "fetch price".into(), depends_on: vec!["t2".into()] },
            DraftTask { task_id: "t2".into(), description: "analyze price".into(), depends_on: vec!["t1".into()] },
        ])
    }
}

impl Planner for FixedPlanner {
    fn decompose(
        &self,
        _query: &Query,
        _agent_registry: &[AgentDescriptor],
        _max_subtasks: usize,
    ) -> plexus_planner::Result<Vec<DraftTask>> {
        Ok(self.drafts.clone())
    }
}

/// A [`Planner`] that always fails with `PlannerUnavailable`, for
/// exercising the engine's fallback to Stage 1's single-task plan.
pub struct UnavailablePlanner;

impl Planner for UnavailablePlanner {
    fn decompose(
        &self,
        _query: &Query,
        _agent_registry: &[AgentDescriptor],
        _max_subtasks: usize,
    ) -> plexus_planner::Result<Vec<DraftTask>> {
        Err(plexus_planner::Error::PlannerUnavailable(
            "fixture: no planner configured".into(),
        ))
    }
}

/// An [`AgentInvoker`] that returns a pre-scripted row set per tool id
/// and records every call it receives, for call-count and parameter
/// assertions.
pub struct ScriptedInvoker {
    responses: HashMap<String, Vec<Value>>,
    calls: Mutex<Vec<(String, HashMap<String, Value>)>>,
}

impl ScriptedInvoker {
    pub fn new(responses: HashMap<String, Vec<Value>>) -> Self {
        Self {
            responses,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, HashMap<String, Value>)> {
        self.calls.lock().expect("scripted invoker call log poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("scripted invoker call log poisoned").len()
    }
}

impl AgentInvoker for ScriptedInvoker {
    fn invoke(&self, tool_id: &str, parameters: &HashMap<String, Value>) -> plexus_agents::Result<ArtifactPayload> {
        self.calls
            .lock()
            .expect("scripted invoker call log poisoned")
            .push((tool_id.to_string(), parameters.clone()));
        let rows = self.responses.get(tool_id).cloned().unwrap_or_default();
        Ok(ArtifactPayload::new(rows, tool_id.to_string()))
    }
}

/// An [`AgentInvoker`] whose every call fails, for exercising upstream-
/// failure-skip semantics end to end.
pub struct FailingInvoker;

impl AgentInvoker for FailingInvoker {
    fn invoke(&self, tool_id: &str, _parameters: &HashMap<String, Value>) -> plexus_agents::Result<ArtifactPayload> {
        Err(plexus_agents::Error::ToolError {
            tool_id: tool_id.to_string(),
            cause: "fixture: scripted failure".into(),
        })
    }
}

/// A [`Validator`] that always approves, recording how many times it was
/// invoked so a test can assert it actually ran.
#[derive(Default)]
pub struct AlwaysValidValidator {
    calls: AtomicUsize,
}

impl AlwaysValidValidator {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Validator for AlwaysValidValidator {
    fn validate(
        &self,
        _query: &Query,
        _answer_text: &str,
        _data_by_agent: &HashMap<String, Vec<Value>>,
    ) -> plexus_sdk::Result<ValidationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ValidationResult {
            valid: true,
            completeness_score: 1.0,
            issues: vec![],
            suggestions: vec![],
        })
    }
}

/// An [`AnswerGenerator`] that returns a fixed string, so a test can tell
/// the LLM-backed path ran rather than the deterministic templated
/// fallback.
pub struct FixedAnswerGenerator(pub String);

impl AnswerGenerator for FixedAnswerGenerator {
    fn generate(
        &self,
        _query: &Query,
        _data_by_agent: &HashMap<String, Vec<Value>>,
        _agent_summaries: &[AgentSummary],
    ) -> plexus_sdk::Result<String> {
        Ok(self.0.clone())
    }
}
