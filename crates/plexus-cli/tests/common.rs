#![cfg(test)]
#![allow(dead_code)]

use assert_cmd::Command;
use tempfile::TempDir;

pub struct TestFixture {
    _temp_dir: TempDir,
    workspace: std::path::PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let workspace = temp_dir.path().join("workspace");

        Self {
            _temp_dir: temp_dir,
            workspace,
        }
    }

    pub fn workspace(&self) -> &std::path::Path {
        &self.workspace
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("plexus").expect("binary `plexus` not found");
        cmd.arg("--workspace").arg(&self.workspace);
        cmd
    }
}
