//! Dependency analysis over a [`plexus_types::Plan`]: cycle detection,
//! topological layering, and path enumeration, shared by the planner and
//! the worker executor.

mod analyzer;
mod error;

pub use analyzer::DependencyAnalyzer;
pub use error::{Error, Result};
