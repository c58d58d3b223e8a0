//! Internal testing fixtures for the plexus engine: mock collaborators
//! (planners, invokers, validators, answer generators), dependency-graph
//! assertion helpers, and an isolated on-disk workspace, shared by
//! `#[cfg(test)]` modules and integration tests across the workspace.
//! Not intended for direct use.

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::TestWorkspace;
