use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Opaque identifier for a single end-to-end query run.
///
/// Format: `YYYYMMDDhhmmss_<6-hex-chars>`, e.g. `20260728143000_a1b2c3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

/// Identifier for a logical session that may span multiple runs (replay,
/// follow-up queries). Same format as [`RunId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl RunId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation context threaded through a single run: the durable
/// [`RunId`] that keys every Task Store / Artifact Bus write, plus the
/// [`SessionId`] extractors stamp onto prediction-market tool calls so a
/// worker's own session-scoped state (rate limits, pagination cursors)
/// stays stable across a run's tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub run_id: RunId,
    pub session_id: SessionId,
}

impl SessionContext {
    pub fn new(run_id: RunId, session_id: SessionId) -> Self {
        Self { run_id, session_id }
    }
}

/// Derives the six hex characters appended to a timestamp-prefixed id from
/// a seed string, the same digest-then-truncate approach the workspace
/// hashing helpers use for project ids.
fn hex_suffix(seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    format!("{:x}", digest)[..6].to_string()
}

/// Generates a [`RunId`] for `now`, salted with `salt` so that two runs
/// started in the same second don't collide (the salt is typically a
/// monotonic counter or the raw query text).
pub fn generate_run_id(now: DateTime<Utc>, salt: &str) -> RunId {
    let prefix = now.format("%Y%m%d%H%M%S").to_string();
    let suffix = hex_suffix(&format!("{}:{}", prefix, salt));
    RunId(format!("{}_{}", prefix, suffix))
}

/// Generates a [`SessionId`] for `now`. Unlike run ids, session ids are
/// meant to be stable across a conversation, so the salt is usually a
/// client-supplied opaque token rather than the query text.
pub fn generate_session_id(now: DateTime<Utc>, salt: &str) -> SessionId {
    let prefix = now.format("%Y%m%d%H%M%S").to_string();
    let suffix = hex_suffix(&format!("{}:{}", prefix, salt));
    SessionId(format!("{}_{}", prefix, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_matches_expected_format() {
        let now = DateTime::parse_from_rfc3339("2026-07-28T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let id = generate_run_id(now, "call options query");
        let s = id.as_str();
        assert_eq!(s.len(), 21);
        assert_eq!(&s[0..14], "20260728143000");
        assert_eq!(&s[14..15], "_");
        assert!(s[15..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_salts_produce_different_ids() {
        let now = DateTime::parse_from_rfc3339("2026-07-28T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = generate_run_id(now, "query a");
        let b = generate_run_id(now, "query b");
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn session_id_is_deterministic_for_same_inputs() {
        let now = DateTime::parse_from_rfc3339("2026-07-28T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = generate_session_id(now, "client-token-1");
        let b = generate_session_id(now, "client-token-1");
        assert_eq!(a.as_str(), b.as_str());
    }
}
