use plexus_agents::ToolLoader;
use plexus_graph::DependencyAnalyzer;
use plexus_types::{AgentDescriptor, AgentKind, Plan, Query, Subtask};

use crate::error::{Error, Result};

/// One subtask as proposed by a [`Planner`] collaborator, before agent
/// mapping. Task ids are freeform here; Stage 1 normalizes them.
#[derive(Debug, Clone)]
pub struct DraftTask {
    pub task_id: String,
    pub description: String,
    pub depends_on: Vec<String>,
}

/// Collaborator that turns a natural-language query into a draft task
/// graph. Implementations typically call out to an LLM; this crate has
/// no opinion on how. `agent_registry` is passed through so an LLM-backed
/// planner can steer its own agent suggestions, and `max_subtasks` so it
/// can bound its own output instead of relying solely on the post-hoc
/// cap in [`decompose`].
pub trait Planner: Send + Sync {
    fn decompose(
        &self,
        query: &Query,
        agent_registry: &[AgentDescriptor],
        max_subtasks: usize,
    ) -> Result<Vec<DraftTask>>;
}

/// Scores keyword overlap between `description` and each known agent's
/// keyword list, returning the best match, or `None` if no agent scores
/// above zero. A zero-score task is left unmapped rather than defaulted
/// to a catch-all agent, so Stage 1's output is honest about what it
/// couldn't route.
fn agent_for_description(loader: &ToolLoader, description: &str) -> Option<AgentKind> {
    let lowered = description.to_lowercase();
    let words: std::collections::HashSet<&str> = lowered.split_whitespace().collect();

    let mut best = None;
    let mut best_score = 0usize;
    for agent in loader.agents() {
        let score = agent
            .keywords
            .iter()
            .filter(|kw| words.contains(kw.as_str()) || lowered.contains(kw.as_str()))
            .count();
        if score > best_score {
            best_score = score;
            best = Some(agent.kind);
        }
    }
    best
}

/// Assigns normalized, unique ids to a list of drafts, rewriting any
/// `depends_on` references to the normalized ids. Drafts are kept in
/// their original order; the i-th draft always gets id `t{i+1}` unless
/// it already had a unique non-empty id.
fn normalize_ids(drafts: &[DraftTask]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut normalized = Vec::with_capacity(drafts.len());
    for (i, draft) in drafts.iter().enumerate() {
        let candidate = if !draft.task_id.is_empty() && seen.insert(draft.task_id.clone()) {
            draft.task_id.clone()
        } else {
            let fallback = format!("t{}", i + 1);
            seen.insert(fallback.clone());
            fallback
        };
        normalized.push(candidate);
    }
    normalized
}

/// Runs Stage 1: decomposition plus agent mapping plus dependency-closure
/// validation. When `planner` is `None`, falls back to a deterministic
/// single-task plan routed by keyword overlap alone — no LLM needed to
/// exercise the rest of the pipeline.
pub fn decompose(
    planner: Option<&dyn Planner>,
    loader: &ToolLoader,
    plan_id: impl Into<String>,
    query: Query,
    max_subtasks: usize,
) -> Result<Plan> {
    let drafts = match planner {
        Some(p) => p.decompose(&query, loader.agents(), max_subtasks)?,
        None => vec![DraftTask {
            task_id: "t1".to_string(),
            description: query.text().to_string(),
            depends_on: vec![],
        }],
    };

    if drafts.len() > max_subtasks {
        return Err(Error::TooManySubtasks {
            max_subtasks,
            found: drafts.len(),
        });
    }

    let normalized_ids = normalize_ids(&drafts);
    let id_map: std::collections::HashMap<&str, &str> = drafts
        .iter()
        .zip(normalized_ids.iter())
        .map(|(d, n)| (d.task_id.as_str(), n.as_str()))
        .collect();

    let subtasks: Vec<Subtask> = drafts
        .iter()
        .zip(normalized_ids.iter())
        .map(|(draft, id)| {
            let agent = agent_for_description(loader, &draft.description);
            Subtask {
                task_id: id.clone(),
                description: draft.description.clone(),
                mappable: agent.is_some(),
                agent,
                depends_on: draft
                    .depends_on
                    .iter()
                    .map(|d| id_map.get(d.as_str()).map(|s| s.to_string()).unwrap_or_else(|| d.clone()))
                    .collect(),
                script_refs: vec![],
            }
        })
        .collect();

    let plan = Plan {
        plan_id: plan_id.into(),
        query,
        subtasks,
    };

    DependencyAnalyzer::analyze(&plan)?;

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TwoStepPlanner;

    impl Planner for TwoStepPlanner {
        fn decompose(
            &self,
            _query: &Query,
            _agent_registry: &[AgentDescriptor],
            _max_subtasks: usize,
        ) -> Result<Vec<DraftTask>> {
            Ok(vec![
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
    }

    #[test]
    fn no_planner_falls_back_to_single_task() {
        let loader = ToolLoader::new();
        let plan = decompose(
            None,
            &loader,
            "plan-1",
            Query::new("what is the closing price of ZN futures"),
            5,
        )
        .unwrap();
        assert_eq!(plan.subtasks.len(), 1);
        assert_eq!(plan.subtasks[0].agent, Some(AgentKind::MarketDataSql));
        assert!(plan.subtasks[0].mappable);
    }

    #[test]
    fn planner_output_is_mapped_to_agents_and_validated() {
        let loader = ToolLoader::new();
        let planner = TwoStepPlanner;
        let plan = decompose(
            Some(&planner),
            &loader,
            "plan-2",
            Query::new("what was the return on ZN futures yesterday"),
            5,
        )
        .unwrap();
        assert_eq!(plan.subtasks.len(), 2);
        assert_eq!(plan.subtask("fetch").unwrap().agent, Some(AgentKind::MarketDataSql));
        assert_eq!(plan.subtask("analyze").unwrap().agent, Some(AgentKind::Analytics));
        assert_eq!(plan.subtask("analyze").unwrap().depends_on, vec!["fetch".to_string()]);
    }

    #[test]
    fn unscored_description_is_left_unmapped_not_defaulted() {
        let loader = ToolLoader::new();
        struct GibberishPlanner;
        impl Planner for GibberishPlanner {
            fn decompose(
                &self,
                _query: &Query,
                _agent_registry: &[AgentDescriptor],
                _max_subtasks: usize,
            ) -> Result<Vec<DraftTask>> {
                Ok(vec![DraftTask {
                    task_id: "a".into(),
                    description: "zzyzx qwop flibbertigibbet".into(),
                    depends_on: vec![],
                }])
            }
        }
        let planner = GibberishPlanner;
        let plan = decompose(Some(&planner), &loader, "plan-4", Query::new("nonsense"), 5).unwrap();
        assert_eq!(plan.subtasks[0].agent, None);
        assert!(!plan.subtasks[0].mappable);
    }

    #[test]
    fn subtask_count_exceeding_max_is_rejected() {
        let loader = ToolLoader::new();
        struct ThreeTaskPlanner;
        impl Planner for ThreeTaskPlanner {
            fn decompose(
                &self,
                _query: &Query,
                _agent_registry: &[AgentDescriptor],
                _max_subtasks: usize,
            ) -> Result<Vec<DraftTask>> {
                Ok(vec![
                    DraftTask { task_id: "a".into(), description: "fetch price".into(), depends_on: vec![] },
                    DraftTask { task_id: "b".into(), description: "analyze a".into(), depends_on: vec!["a".into()] },
                    DraftTask { task_id: "c".into(), description: "analyze b".into(), depends_on: vec!["b".into()] },
                ])
            }
        }
        let planner = ThreeTaskPlanner;
        let result = decompose(Some(&planner), &loader, "plan-3", Query::new("chain"), 2);
        assert!(matches!(result, Err(Error::TooManySubtasks { max_subtasks: 2, found: 3 })));
    }
}
