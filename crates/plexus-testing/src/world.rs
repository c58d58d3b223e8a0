use std::path::Path;

use plexus_sdk::RunOptions;
use tempfile::TempDir;

/// An isolated on-disk workspace for exercising `plexus_sdk::run`
/// without touching a caller's real `~/.plexus` directory. Dropped at
/// the end of the test, taking its task store, artifacts, and logs with
/// it.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp workspace dir");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// [`RunOptions`] rooted at this workspace, with every other field
    /// left at its default (the deterministic fallbacks, `EchoInvoker`,
    /// no validator).
    pub fn run_options(&self) -> RunOptions {
        RunOptions::new(self.root().to_path_buf())
    }
}
