use std::collections::HashMap;

use once_cell::sync::Lazy;
use plexus_types::{SessionContext, Subtask};
use regex::Regex;
use serde_json::Value;

/// Stock/futures-style ticker: 1-4 uppercase letters, not a common English
/// word caught in the description's prose.
static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,4}\b").unwrap());

const STOPWORD_SYMBOLS: &[&str] = &["SQL"];

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());

static BETWEEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)between\s+(-?\d+(?:\.\d+)?)\s+and\s+(-?\d+(?:\.\d+)?)").unwrap()
});

static FROM_TO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)from\s+(-?\d+(?:\.\d+)?)\s+to\s+(-?\d+(?:\.\d+)?)").unwrap()
});

static GREATER_THAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:>|greater than|above)\s+(-?\d+(?:\.\d+)?)").unwrap()
});

static LESS_THAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:<|less than|below)\s+(-?\d+(?:\.\d+)?)").unwrap()
});

static TOP_N_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:top|first)\s+(\d+)").unwrap());

/// A numeric filter recognized in a subtask description: either a closed
/// range (`BETWEEN`) or a one-sided comparison (`>`/`<`).
enum NumericFilter {
    Between(f64, f64),
    GreaterThan(f64),
    LessThan(f64),
}

fn find_numeric_filter(description: &str) -> Option<NumericFilter> {
    if let Some(caps) = BETWEEN_RE.captures(description).or_else(|| FROM_TO_RE.captures(description)) {
        let lo: f64 = caps[1].parse().ok()?;
        let hi: f64 = caps[2].parse().ok()?;
        return Some(NumericFilter::Between(lo.min(hi), lo.max(hi)));
    }
    if let Some(caps) = GREATER_THAN_RE.captures(description) {
        return Some(NumericFilter::GreaterThan(caps[1].parse().ok()?));
    }
    if let Some(caps) = LESS_THAN_RE.captures(description) {
        return Some(NumericFilter::LessThan(caps[1].parse().ok()?));
    }
    None
}

/// Recognizes an ordering cue ("most recent" / "oldest") in a
/// description, returning `(column, direction, implied_limit)`.
fn find_ordering(description: &str) -> Option<(&'static str, &'static str, Option<i64>)> {
    let lowered = description.to_lowercase();
    if lowered.contains("most recent") || lowered.contains("latest") || lowered.contains("newest") {
        Some(("file_date", "DESC", Some(1)))
    } else if lowered.contains("oldest") || lowered.contains("earliest") {
        Some(("file_date", "ASC", None))
    } else {
        None
    }
}

fn find_limit(description: &str) -> Option<i64> {
    TOP_N_RE.captures(description).and_then(|c| c[1].parse().ok())
}

/// Market-data ticker suffix conventions: call options are traded under a
/// `.C` suffix, puts under `.P` (e.g. `ZN.C`), matching the SQL-style
/// `symbol LIKE '%...'` filter the underlying warehouse expects.
fn option_suffix_pattern(description: &str) -> Option<&'static str> {
    let lowered = description.to_lowercase();
    if lowered.contains("call option") || lowered.contains("call options") {
        Some("%.C")
    } else if lowered.contains("put option") || lowered.contains("put options") {
        Some("%.P")
    } else {
        None
    }
}

/// Extracts `market_data_sql.query` parameters from a subtask's
/// description: a symbol pattern, the price field, any
/// recognized date/numeric/ordering/limit cues folded into a SQL-style
/// `conditions`/`values` pair, an `order_by_column`/`order_by_direction`,
/// and a `limit`. Falls back to best-effort defaults (and flags
/// `needs_review`) when no ticker-looking token is found.
pub fn extract_sql_market(subtask: &Subtask) -> (HashMap<String, Value>, bool) {
    let description = &subtask.description;
    let mut params = HashMap::new();
    let mut needs_review = false;

    let mut conditions = Vec::new();
    let mut values = Vec::new();

    let symbol_pattern = if let Some(suffix) = option_suffix_pattern(description) {
        suffix.to_string()
    } else {
        match SYMBOL_RE
            .find_iter(description)
            .map(|m| m.as_str())
            .find(|s| !STOPWORD_SYMBOLS.contains(s))
        {
            Some(sym) => format!("%{}%", sym),
            None => {
                needs_review = true;
                "%".to_string()
            }
        }
    };
    conditions.push("symbol LIKE ?".to_string());
    values.push(Value::String(symbol_pattern.clone()));
    params.insert("symbol_pattern".to_string(), Value::String(symbol_pattern));

    let lowered = description.to_lowercase();
    let field = if lowered.contains("closing") || lowered.contains("close") {
        "close"
    } else if lowered.contains("opening") || lowered.contains("open") {
        "open"
    } else if lowered.contains("volume") {
        "volume"
    } else if lowered.contains("high") {
        "high"
    } else if lowered.contains("low") {
        "low"
    } else {
        needs_review = true;
        "close"
    };
    params.insert("field".to_string(), Value::String(field.to_string()));

    match find_numeric_filter(description) {
        Some(NumericFilter::Between(lo, hi)) => {
            conditions.push("price BETWEEN ? AND ?".to_string());
            values.push(Value::from(lo));
            values.push(Value::from(hi));
        }
        Some(NumericFilter::GreaterThan(n)) => {
            conditions.push("price > ?".to_string());
            values.push(Value::from(n));
        }
        Some(NumericFilter::LessThan(n)) => {
            conditions.push("price < ?".to_string());
            values.push(Value::from(n));
        }
        None => {}
    }

    if let Some(iso_date) = ISO_DATE_RE.find(description) {
        conditions.push("file_date = ?".to_string());
        values.push(Value::String(iso_date.as_str().to_string()));
    }

    params.insert(
        "conditions".to_string(),
        Value::String(conditions.join(" AND ")),
    );
    params.insert("values".to_string(), Value::Array(values));

    let mut limit = find_limit(description);
    if let Some((column, direction, ordering_limit)) = find_ordering(description) {
        params.insert("order_by_column".to_string(), Value::String(column.to_string()));
        params.insert(
            "order_by_direction".to_string(),
            Value::String(direction.to_string()),
        );
        limit = limit.or(ordering_limit);
    }
    if let Some(limit) = limit {
        params.insert("limit".to_string(), Value::from(limit));
    }

    (params, needs_review)
}

/// Extracts `prediction_market_search.search` parameters: a `topic` with
/// lead-in verbs and date/comparison cues stripped, an optional `limit`,
/// and the run's `session_id` so the worker's pagination/rate-limit state
/// stays scoped to this run.
pub fn extract_prediction_search(
    subtask: &Subtask,
    session: &SessionContext,
) -> (HashMap<String, Value>, bool) {
    static LEAD_IN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)^(find|search|look up|check)\s+(prediction market(s)?\s+(for|on)\s+)?")
            .unwrap()
    });

    let mut topic = LEAD_IN.replace(&subtask.description, "").trim().to_string();
    topic = ISO_DATE_RE.replace_all(&topic, "").trim().to_string();
    topic = GREATER_THAN_RE.replace_all(&topic, "").trim().to_string();
    topic = LESS_THAN_RE.replace_all(&topic, "").trim().to_string();

    let needs_review = topic.is_empty();
    let topic = if needs_review {
        subtask.description.clone()
    } else {
        topic
    };

    let mut params = HashMap::new();
    params.insert("topic".to_string(), Value::String(topic));
    if let Some(limit) = find_limit(&subtask.description) {
        params.insert("limit".to_string(), Value::from(limit));
    }
    params.insert(
        "session_id".to_string(),
        Value::String(session.session_id.as_str().to_string()),
    );
    (params, needs_review)
}

/// Fallback extractor for any agent without a dedicated extractor
/// (historical analysis / generic): hands the whole
/// description through as a single `query` parameter, lifting an ISO date
/// out into its own field when present, and always flags `needs_review`
/// so Stage 2's caller knows the extraction is a best-effort guess.
pub fn extract_generic(subtask: &Subtask) -> (HashMap<String, Value>, bool) {
    let mut params = HashMap::new();
    params.insert(
        "query".to_string(),
        Value::String(subtask.description.clone()),
    );
    if let Some(iso_date) = ISO_DATE_RE.find(&subtask.description) {
        params.insert("date".to_string(), Value::String(iso_date.as_str().to_string()));
    }
    (params, true)
}
