use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use plexus_types::{Artifact, ArtifactManifest, ArtifactPayload};

use crate::error::{Error, Result};

/// Append-only, content-addressed publish point for worker outputs.
///
/// Each agent gets its own directory under `root/<agent_id>/out/`, with
/// files named by monotonic sequence number, plus a `meta.json` manifest
/// tracking the next sequence to hand out. Publishing is atomic: the
/// payload is written to a temp file in the same directory, fsynced, then
/// renamed into place, and the manifest is only advanced once the rename
/// succeeds.
pub struct ArtifactBus {
    root: PathBuf,
    manifests: Mutex<HashMap<String, ArtifactManifest>>,
}

impl ArtifactBus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifests: Mutex::new(HashMap::new()),
        }
    }

    fn agent_dir(&self, agent_id: &str) -> PathBuf {
        self.root.join(agent_id).join("out")
    }

    fn manifest_path(&self, agent_id: &str) -> PathBuf {
        self.root.join(agent_id).join("meta.json")
    }

    fn load_manifest(&self, agent_id: &str) -> Result<ArtifactManifest> {
        let path = self.manifest_path(agent_id);
        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(ArtifactManifest::new(agent_id, Utc::now()))
        }
    }

    fn persist_manifest(&self, manifest: &ArtifactManifest) -> Result<()> {
        let path = self.manifest_path(&manifest.agent_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_vec_pretty(manifest)?;
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, &serialized)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Validates and publishes `payload` for `agent_id`, returning the
    /// resulting [`Artifact`] with its assigned sequence number.
    pub fn publish(&self, agent_id: &str, payload: ArtifactPayload) -> Result<Artifact> {
        payload.validate().map_err(Error::InvalidPayload)?;

        let mut manifests = self.manifests.lock().expect("artifact manifest lock poisoned");
        let mut manifest = match manifests.remove(agent_id) {
            Some(m) => m,
            None => self.load_manifest(agent_id)?,
        };

        let out_dir = self.agent_dir(agent_id);
        std::fs::create_dir_all(&out_dir)?;

        let now = Utc::now();
        let sequence = manifest.next_sequence;
        let final_path = out_dir.join(format!("{}.json", sequence));
        let tmp_path = out_dir.join(format!(".{}.json.tmp", sequence));

        let artifact = Artifact {
            agent_id: agent_id.to_string(),
            sequence,
            published_at: now,
            payload,
        };
        let serialized = serde_json::to_vec_pretty(&artifact)?;

        std::fs::write(&tmp_path, &serialized)?;
        let file = std::fs::File::open(&tmp_path)?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, &final_path)?;

        manifest.advance(now);
        self.persist_manifest(&manifest)?;
        manifests.insert(agent_id.to_string(), manifest);

        Ok(artifact)
    }

    /// Reads back a previously published artifact by sequence number.
    pub fn read(&self, agent_id: &str, sequence: u64) -> Result<Artifact> {
        let path = self.agent_dir(agent_id).join(format!("{}.json", sequence));
        let raw = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Reads every artifact published for `agent_id`, in publish order.
    pub fn read_all(&self, agent_id: &str) -> Result<Vec<Artifact>> {
        let manifest = {
            let manifests = self.manifests.lock().expect("artifact manifest lock poisoned");
            manifests
                .get(agent_id)
                .cloned()
                .map(Ok)
                .unwrap_or_else(|| self.load_manifest(agent_id))?
        };
        let mut artifacts = Vec::with_capacity(manifest.total_published as usize);
        for sequence in 0..manifest.next_sequence {
            let candidate = self.agent_dir(agent_id).join(format!("{}.json", sequence));
            if candidate.exists() {
                artifacts.push(self.read(agent_id, sequence)?);
            }
        }
        Ok(artifacts)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> ArtifactPayload {
        ArtifactPayload::new(
            vec![serde_json::json!({"price": 101.25})],
            "market_data_sql.query",
        )
    }

    #[test]
    fn publish_assigns_monotonic_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let bus = ArtifactBus::new(dir.path());

        let first = bus.publish("market_data_sql", sample_payload()).unwrap();
        let second = bus.publish("market_data_sql", sample_payload()).unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
    }

    #[test]
    fn publish_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let bus = ArtifactBus::new(dir.path());

        let published = bus.publish("analytics", sample_payload()).unwrap();
        let read_back = bus.read("analytics", published.sequence).unwrap();
        assert_eq!(read_back.payload.data, published.payload.data);
    }

    #[test]
    fn invalid_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let bus = ArtifactBus::new(dir.path());

        let mut bad = sample_payload();
        bad.metadata.remove("row_count");
        assert!(bus.publish("analytics", bad).is_err());
    }

    #[test]
    fn read_all_returns_publish_order() {
        let dir = tempfile::tempdir().unwrap();
        let bus = ArtifactBus::new(dir.path());
        for _ in 0..3 {
            bus.publish("web_puller", sample_payload()).unwrap();
        }
        let all = bus.read_all("web_puller").unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.iter().map(|a| a.sequence).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
