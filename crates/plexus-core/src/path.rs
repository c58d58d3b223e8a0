use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const ENV_WORKSPACE: &str = "PLEXUS_PATH";
const FALLBACK_DIRNAME: &str = ".plexus";

/// Resolves the on-disk root of the plexus workspace (where the task
/// store database, agent artifact trees, and logs live).
///
/// Priority, highest first:
/// 1. `explicit`, if given on the command line (`--workspace`)
/// 2. the `PLEXUS_PATH` environment variable
/// 3. the platform data dir (`$XDG_DATA_HOME/plexus`, `~/Library/Application
///    Support/plexus`, `%APPDATA%\plexus`)
/// 4. `~/.plexus`, if none of the above resolve
pub fn resolve_workspace_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = std::env::var(ENV_WORKSPACE) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(expand_tilde(&env_path)));
        }
    }
    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("plexus"));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        Error::Config("could not determine a home directory for the workspace fallback".into())
    })?;
    Ok(home.join(FALLBACK_DIRNAME))
}

fn expand_tilde(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    raw.to_string()
}

/// Layout helpers for the resolved workspace root. Every other crate that
/// needs an on-disk path asks here rather than hand-joining components.
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn task_store_db(&self) -> PathBuf {
        self.root.join("orchestrator_results.db")
    }

    pub fn agent_out_dir(&self, agent_id: &str) -> PathBuf {
        self.root.join("agents").join(agent_id).join("out")
    }

    pub fn agent_artifact_path(&self, agent_id: &str, sequence: u64) -> PathBuf {
        self.agent_out_dir(agent_id).join(format!("{}.json", sequence))
    }

    pub fn agent_manifest_path(&self, agent_id: &str) -> PathBuf {
        self.root.join("agents").join(agent_id).join("meta.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/my-workspace");
        let resolved = resolve_workspace_path(Some(&explicit)).unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn layout_paths_nest_under_root() {
        let layout = WorkspaceLayout::new(PathBuf::from("/tmp/ws"));
        assert_eq!(layout.task_store_db(), PathBuf::from("/tmp/ws/orchestrator_results.db"));
        assert_eq!(
            layout.agent_artifact_path("market_data_sql", 3),
            PathBuf::from("/tmp/ws/agents/market_data_sql/out/3.json")
        );
        assert_eq!(
            layout.agent_manifest_path("market_data_sql"),
            PathBuf::from("/tmp/ws/agents/market_data_sql/meta.json")
        );
    }
}
