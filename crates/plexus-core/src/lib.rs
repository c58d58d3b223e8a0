//! Workspace-level concerns shared by every stage of the engine:
//! configuration loading and the on-disk layout of a plexus workspace.

mod config;
mod error;
mod path;

pub use config::{Config, LogLevel};
pub use error::{Error, Result};
pub use path::{resolve_workspace_path, WorkspaceLayout};
