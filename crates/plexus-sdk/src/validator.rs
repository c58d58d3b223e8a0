use std::collections::HashMap;

use plexus_types::{Query, ValidationResult};
use serde_json::Value;

use crate::error::Result;

/// Collaborator that judges whether a consolidated answer actually
/// addresses the query it was built for, given the raw outputs behind
/// it. Implementations typically call out to an LLM; this crate has no
/// opinion on how. Object-safe so `RunOptions` can hold one behind a
/// `Box<dyn Validator>`.
pub trait Validator: Send + Sync {
    fn validate(
        &self,
        query: &Query,
        answer_text: &str,
        data_by_agent: &HashMap<String, Vec<Value>>,
    ) -> Result<ValidationResult>;
}
