use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::resolve_workspace_path;

fn default_max_parallel() -> usize {
    4
}

fn default_task_timeout_secs() -> u64 {
    120
}

fn default_dependency_wait_timeout_secs() -> u64 {
    30
}

fn default_max_decomposition_depth() -> usize {
    5
}

/// Top-level configuration for a plexus workspace, loaded from
/// `plexus.toml` with environment and CLI-flag overrides layered on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub workspace_root: PathBuf,

    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    #[serde(default = "default_dependency_wait_timeout_secs")]
    pub dependency_wait_timeout_secs: u64,

    #[serde(default = "default_max_decomposition_depth")]
    pub max_decomposition_depth: usize,

    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::new(),
            max_parallel: default_max_parallel(),
            task_timeout_secs: default_task_timeout_secs(),
            dependency_wait_timeout_secs: default_dependency_wait_timeout_secs(),
            max_decomposition_depth: default_max_decomposition_depth(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Loads config from `<workspace_root>/plexus.toml` if it exists,
    /// falling back to defaults otherwise. `explicit_workspace` overrides
    /// workspace discovery the same way `--workspace` does on the CLI.
    pub fn load(explicit_workspace: Option<&Path>) -> Result<Self> {
        let workspace_root = resolve_workspace_path(explicit_workspace)?;
        let config_path = workspace_root.join("plexus.toml");

        let mut config = if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&raw)?
        } else {
            Config::default()
        };
        config.workspace_root = workspace_root;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.workspace_root)?;
        let config_path = self.workspace_root.join("plexus.toml");
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(config_path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.task_timeout_secs, 120);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn load_falls_back_to_defaults_when_no_file_present() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path())).unwrap();
        assert_eq!(config.workspace_root, dir.path());
        assert_eq!(config.max_parallel, 4);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load(Some(dir.path())).unwrap();
        config.max_parallel = 9;
        config.save().unwrap();

        let reloaded = Config::load(Some(dir.path())).unwrap();
        assert_eq!(reloaded.max_parallel, 9);
    }
}
