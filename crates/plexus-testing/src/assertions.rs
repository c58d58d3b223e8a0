//! Small assertion helpers for plexus-specific invariants, so tests
//! don't repeat Dependency Analyzer setup boilerplate.

use plexus_graph::DependencyAnalyzer;
use plexus_types::Plan;

/// `plan`'s topological layers as owned strings, panicking if the plan
/// is not acyclic (Stage 1 should never hand a cyclic plan downstream).
pub fn parallel_groups(plan: &Plan) -> Vec<Vec<String>> {
    let analyzer = DependencyAnalyzer::analyze(plan).expect("plan must be acyclic");
    analyzer
        .parallel_groups()
        .iter()
        .map(|group| group.iter().map(|id| id.to_string()).collect())
        .collect()
}

/// `plan`'s leaf-to-root dependency paths as owned strings.
pub fn leaf_to_root_paths(plan: &Plan) -> Vec<Vec<String>> {
    let analyzer = DependencyAnalyzer::analyze(plan).expect("plan must be acyclic");
    analyzer
        .leaf_to_root_paths()
        .iter()
        .map(|path| path.iter().map(|id| id.to_string()).collect())
        .collect()
}
