use std::collections::{BTreeSet, HashMap};

use plexus_types::{AgentSummary, ConsolidatedResult, Query, TaskOutputRecord};
use serde_json::Value;

use crate::error::Result;
use crate::validator::Validator;

const PREDICTION_MARKET_AGENT: &str = "prediction_market_search";

/// Collaborator that turns consolidated outputs into natural-language
/// prose. Implementations typically call out to an LLM; this crate has
/// no opinion on how. Absent one, [`consolidate`] falls back to a
/// deterministic templated answer, mirroring Stage 1's no-planner
/// posture.
pub trait AnswerGenerator: Send + Sync {
    fn generate(
        &self,
        query: &Query,
        data_by_agent: &HashMap<String, Vec<Value>>,
        agent_summaries: &[AgentSummary],
    ) -> Result<String>;
}

/// Runs the Runner's consolidation procedure: buckets raw
/// task outputs by agent, computes per-agent summary stats, synthesizes
/// an answer, and optionally calls a validator collaborator.
pub fn consolidate(
    query: &Query,
    outputs: Vec<(String, TaskOutputRecord)>,
    answer_generator: Option<&dyn AnswerGenerator>,
    validator: Option<&dyn Validator>,
    skip_validation: bool,
) -> Result<ConsolidatedResult> {
    let mut data_by_agent: HashMap<String, Vec<Value>> = HashMap::new();
    for (agent_id, record) in outputs {
        let rows = record
            .output
            .get("data")
            .and_then(|d| d.as_array())
            .cloned()
            .unwrap_or_default();
        data_by_agent.entry(agent_id).or_default().extend(rows);
    }

    let mut agent_ids: Vec<String> = data_by_agent.keys().cloned().collect();
    agent_ids.sort();

    let agent_summaries: Vec<AgentSummary> = agent_ids
        .into_iter()
        .map(|agent_id| {
            let rows = &data_by_agent[&agent_id];
            let summary_stats = numeric_stats(&agent_id, rows);
            AgentSummary {
                agent_id,
                output_count: rows.len(),
                summary_stats,
            }
        })
        .collect();

    let answer_text = match answer_generator {
        Some(generator) => generator.generate(query, &data_by_agent, &agent_summaries)?,
        None => templated_answer(&agent_summaries),
    };

    let validation = if skip_validation {
        None
    } else {
        match validator {
            Some(v) => Some(v.validate(query, &answer_text, &data_by_agent)?),
            None => None,
        }
    };

    Ok(ConsolidatedResult {
        answer_text,
        data_by_agent,
        agent_summaries,
        validation,
    })
}

/// Deterministic templated answer used when no LLM-backed
/// [`AnswerGenerator`] is configured: one bullet per agent with its row
/// count and up to three salient summary fields.
fn templated_answer(agent_summaries: &[AgentSummary]) -> String {
    if agent_summaries.is_empty() {
        return "No agent produced any output for this query.".to_string();
    }
    let mut lines = Vec::with_capacity(agent_summaries.len());
    for summary in agent_summaries {
        let mut stats: Vec<(&String, &f64)> = summary.summary_stats.iter().collect();
        stats.sort_by(|a, b| a.0.cmp(b.0));
        let stats_text: Vec<String> = stats
            .iter()
            .take(3)
            .map(|(k, v)| format!("{} = {:.2}", k, v))
            .collect();
        if stats_text.is_empty() {
            lines.push(format!("- {}: {} row(s)", summary.agent_id, summary.output_count));
        } else {
            lines.push(format!(
                "- {}: {} row(s) ({})",
                summary.agent_id,
                summary.output_count,
                stats_text.join(", ")
            ));
        }
    }
    lines.join("\n")
}

/// Per-agent summary stats: prediction-market
/// outputs get `avg_probability`/`total_volume`; everything else gets
/// `min_/max_/avg_<field>` over every numeric field present in its rows.
fn numeric_stats(agent_id: &str, rows: &[Value]) -> HashMap<String, f64> {
    let mut stats = HashMap::new();

    if agent_id == PREDICTION_MARKET_AGENT {
        if let Some(avg) = average_field(rows, "probability") {
            stats.insert("avg_probability".to_string(), avg);
        }
        if let Some(total) = sum_field(rows, "volume") {
            stats.insert("total_volume".to_string(), total);
        }
        return stats;
    }

    let mut fields: BTreeSet<String> = BTreeSet::new();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for (key, value) in obj {
                if value.is_number() {
                    fields.insert(key.clone());
                }
            }
        }
    }
    for field in fields {
        if let Some((min, max, avg)) = min_max_avg(rows, &field) {
            stats.insert(format!("min_{}", field), min);
            stats.insert(format!("max_{}", field), max);
            stats.insert(format!("avg_{}", field), avg);
        }
    }
    stats
}

fn field_values(rows: &[Value], field: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| row.get(field).and_then(|v| v.as_f64()))
        .collect()
}

fn average_field(rows: &[Value], field: &str) -> Option<f64> {
    let values = field_values(rows, field);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sum_field(rows: &[Value], field: &str) -> Option<f64> {
    let values = field_values(rows, field);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum())
}

fn min_max_avg(rows: &[Value], field: &str) -> Option<(f64, f64, f64)> {
    let values = field_values(rows, field);
    if values.is_empty() {
        return None;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some((min, max, avg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_types::RunId;

    fn output(agent: &str, task_id: &str, data: Value) -> (String, TaskOutputRecord) {
        (
            agent.to_string(),
            TaskOutputRecord {
                run_id: RunId::new("20260728143000_abcdef"),
                task_id: task_id.to_string(),
                output: serde_json::json!({
                    "data": data,
                    "metadata": {"row_count": 1, "source_tool_id": "x"},
                }),
                produced_at: chrono::Utc::now(),
            },
        )
    }

    #[test]
    fn buckets_rows_by_agent_and_computes_stats() {
        let outputs = vec![
            output(
                "market_data_sql",
                "t1",
                serde_json::json!([{"price": 101.0}, {"price": 103.0}]),
            ),
            output(
                "prediction_market_search",
                "t2",
                serde_json::json!([{"probability": 0.4, "volume": 1000.0}]),
            ),
        ];
        let result = consolidate(&Query::new("q"), outputs, None, None, true).unwrap();

        assert_eq!(result.data_by_agent["market_data_sql"].len(), 2);
        let market = result.summary_for("market_data_sql").unwrap();
        assert_eq!(market.summary_stats["min_price"], 101.0);
        assert_eq!(market.summary_stats["max_price"], 103.0);

        let prediction = result.summary_for("prediction_market_search").unwrap();
        assert_eq!(prediction.summary_stats["avg_probability"], 0.4);
        assert_eq!(prediction.summary_stats["total_volume"], 1000.0);

        assert!(!result.answer_text.is_empty());
        assert!(result.validation.is_none());
    }

    #[test]
    fn no_outputs_produces_deterministic_empty_answer() {
        let result = consolidate(&Query::new("q"), vec![], None, None, true).unwrap();
        assert_eq!(result.answer_text, "No agent produced any output for this query.");
    }
}
