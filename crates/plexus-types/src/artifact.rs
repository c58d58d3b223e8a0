use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical payload shape every published artifact must conform to: a
/// row-oriented `data` array plus metadata that must at minimum record
/// how many rows are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPayload {
    pub data: Vec<serde_json::Value>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ArtifactPayload {
    /// The metadata keys every artifact payload must carry.
    pub const REQUIRED_METADATA_KEYS: &'static [&'static str] = &["row_count", "source_tool_id"];

    pub fn new(data: Vec<serde_json::Value>, source_tool_id: impl Into<String>) -> Self {
        let row_count = data.len();
        let mut metadata = HashMap::new();
        metadata.insert("row_count".to_string(), serde_json::json!(row_count));
        metadata.insert(
            "source_tool_id".to_string(),
            serde_json::json!(source_tool_id.into()),
        );
        Self { data, metadata }
    }

    /// Validates that `row_count` matches `data.len()` and all required
    /// metadata keys are present.
    pub fn validate(&self) -> Result<(), String> {
        for key in Self::REQUIRED_METADATA_KEYS {
            if !self.metadata.contains_key(*key) {
                return Err(format!("artifact payload missing metadata key '{}'", key));
            }
        }
        let declared = self
            .metadata
            .get("row_count")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| "metadata 'row_count' is not an integer".to_string())?;
        if declared as usize != self.data.len() {
            return Err(format!(
                "declared row_count {} does not match data length {}",
                declared,
                self.data.len()
            ));
        }
        Ok(())
    }
}

/// One published artifact: the per-agent sequence number it was assigned,
/// and the validated payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub agent_id: String,
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
    pub payload: ArtifactPayload,
}

/// Tracks the next sequence number and publish counters for one agent's
/// artifact stream, persisted alongside the artifact files themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub agent_id: String,
    pub next_sequence: u64,
    pub total_published: u64,
    pub last_updated_at: DateTime<Utc>,
}

impl ArtifactManifest {
    pub fn new(agent_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            agent_id: agent_id.into(),
            next_sequence: 0,
            total_published: 0,
            last_updated_at: now,
        }
    }

    /// Reserves the next sequence number and advances the manifest.
    pub fn advance(&mut self, now: DateTime<Utc>) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        self.total_published += 1;
        self.last_updated_at = now;
        seq
    }
}
