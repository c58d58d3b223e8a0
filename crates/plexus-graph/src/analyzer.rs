use std::collections::{HashMap, HashSet, VecDeque};

use plexus_types::{InvalidPlanReason, Plan};

use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// A validated view over a [`Plan`]'s dependency graph: adjacency in both
/// directions, precomputed once so the planner, executor, and CLI can all
/// query it without re-walking the subtask list.
pub struct DependencyAnalyzer<'a> {
    plan: &'a Plan,
    dependents: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> DependencyAnalyzer<'a> {
    /// Builds an analyzer over `plan`, validating that every `depends_on`
    /// reference resolves to a known task and that the graph is acyclic.
    pub fn analyze(plan: &'a Plan) -> Result<Self> {
        if plan.is_empty() {
            return Err(Error::Types(plexus_types::Error::InvalidPlan(
                InvalidPlanReason::Empty,
            )));
        }

        let known: HashSet<&str> = plan.subtasks.iter().map(|s| s.task_id.as_str()).collect();
        for subtask in &plan.subtasks {
            for dep in &subtask.depends_on {
                if !known.contains(dep.as_str()) {
                    return Err(Error::Types(plexus_types::Error::InvalidPlan(
                        InvalidPlanReason::DanglingDependency {
                            task_id: subtask.task_id.clone(),
                            missing_dep: dep.clone(),
                        },
                    )));
                }
            }
        }

        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for subtask in &plan.subtasks {
            dependents.entry(subtask.task_id.as_str()).or_default();
            for dep in &subtask.depends_on {
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(subtask.task_id.as_str());
            }
        }

        let analyzer = Self { plan, dependents };
        analyzer.check_acyclic()?;
        Ok(analyzer)
    }

    fn check_acyclic(&self) -> Result<()> {
        let mut state: HashMap<&str, VisitState> = self
            .plan
            .subtasks
            .iter()
            .map(|s| (s.task_id.as_str(), VisitState::Unvisited))
            .collect();

        for subtask in &self.plan.subtasks {
            if state[subtask.task_id.as_str()] == VisitState::Unvisited {
                let mut stack = Vec::new();
                if let Some(cycle) = self.find_cycle(subtask.task_id.as_str(), &mut state, &mut stack) {
                    return Err(Error::Types(plexus_types::Error::InvalidPlan(
                        InvalidPlanReason::Cycle(cycle),
                    )));
                }
            }
        }
        Ok(())
    }

    fn find_cycle(
        &self,
        task_id: &'a str,
        state: &mut HashMap<&'a str, VisitState>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        state.insert(task_id, VisitState::InProgress);
        stack.push(task_id);

        let subtask = self.plan.subtask(task_id).expect("task_id came from plan");
        for dep in &subtask.depends_on {
            match state.get(dep.as_str()) {
                Some(VisitState::InProgress) => {
                    let start = stack.iter().position(|t| *t == dep.as_str()).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                Some(VisitState::Done) => continue,
                _ => {
                    if let Some(cycle) = self.find_cycle(dep.as_str(), state, stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        stack.pop();
        state.insert(task_id, VisitState::Done);
        None
    }

    /// All task ids that `task_id` transitively depends on, not including
    /// itself.
    pub fn transitive_deps(&self, task_id: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        if let Some(subtask) = self.plan.subtask(task_id) {
            queue.extend(subtask.depends_on.iter().map(|s| s.as_str()));
        }
        while let Some(current) = queue.pop_front() {
            if seen.insert(current.to_string()) {
                if let Some(subtask) = self.plan.subtask(current) {
                    queue.extend(subtask.depends_on.iter().map(|s| s.as_str()));
                }
            }
        }
        seen
    }

    /// Tasks whose dependencies are all contained in `completed`.
    pub fn ready(&self, completed: &HashSet<String>) -> Vec<&'a str> {
        self.plan
            .subtasks
            .iter()
            .filter(|s| !completed.contains(&s.task_id))
            .filter(|s| s.depends_on.iter().all(|d| completed.contains(d)))
            .map(|s| s.task_id.as_str())
            .collect()
    }

    /// Groups task ids into layers such that every task in layer N
    /// depends only on tasks in layers `0..N`. Layers can run in
    /// parallel; within a layer, order is unspecified.
    ///
    /// Computed with Kahn's algorithm: tasks enter the frontier once
    /// their indegree (remaining unresolved dependency count) hits zero.
    pub fn parallel_groups(&self) -> Vec<Vec<&'a str>> {
        let mut indegree: HashMap<&str, usize> = self
            .plan
            .subtasks
            .iter()
            .map(|s| (s.task_id.as_str(), s.depends_on.len()))
            .collect();

        // Stable ordering: seed the frontier in Stage-1-assigned ordinal
        // order rather than the indegree map's (randomized) iteration
        // order, so two runs of the same plan group identically.
        let mut frontier: VecDeque<&str> = self
            .plan
            .subtasks
            .iter()
            .map(|s| s.task_id.as_str())
            .filter(|id| indegree.get(id).copied().unwrap_or(0) == 0)
            .collect();

        let mut groups = Vec::new();
        let mut remaining = indegree.len();

        while !frontier.is_empty() {
            let layer: Vec<&str> = frontier.drain(..).collect();
            remaining -= layer.len();
            for task_id in &layer {
                if let Some(dependents) = self.dependents.get(task_id) {
                    for dependent in dependents {
                        let deg = indegree.get_mut(dependent).expect("known task");
                        *deg -= 1;
                        if *deg == 0 {
                            frontier.push_back(dependent);
                        }
                    }
                }
            }
            groups.push(layer);
        }

        debug_assert_eq!(remaining, 0, "acyclic graph must fully drain");
        groups
    }

    /// Every leaf-to-root dependency path through the graph, where a leaf
    /// is a task with no dependents and a root is a task with no
    /// dependencies. A sink with more than one predecessor (e.g. the
    /// bottom of a diamond) contributes one path per predecessor chain,
    /// so Stage 2 sees each chain in isolation. Used by Stage 2 to plan
    /// tool selection in isolated per-path contexts.
    pub fn leaf_to_root_paths(&self) -> Vec<Vec<&'a str>> {
        let leaves: Vec<&str> = self
            .plan
            .subtasks
            .iter()
            .map(|s| s.task_id.as_str())
            .filter(|id| self.dependents.get(id).map(|d| d.is_empty()).unwrap_or(true))
            .collect();

        let mut paths = Vec::new();
        let mut seen = HashSet::new();
        for leaf in leaves {
            let mut suffix = vec![leaf];
            self.collect_paths_from(leaf, &mut suffix, &mut paths, &mut seen);
        }
        paths
    }

    /// Recursively walks every predecessor chain from `current` back to a
    /// source, appending completed root-to-leaf paths (built by reversing
    /// `suffix`, which accumulates leaf-to-root) to `out`. `seen`
    /// deduplicates identical paths discovered through different
    /// recursion orders.
    fn collect_paths_from(
        &self,
        current: &'a str,
        suffix: &mut Vec<&'a str>,
        out: &mut Vec<Vec<&'a str>>,
        seen: &mut HashSet<Vec<&'a str>>,
    ) {
        let subtask = match self.plan.subtask(current) {
            Some(s) => s,
            None => return,
        };

        if subtask.depends_on.is_empty() {
            let mut path: Vec<&str> = suffix.clone();
            path.reverse();
            if seen.insert(path.clone()) {
                out.push(path);
            }
            return;
        }

        for dep in &subtask.depends_on {
            let dep_id = self
                .plan
                .subtask(dep.as_str())
                .map(|s| s.task_id.as_str())
                .unwrap_or(dep.as_str());
            suffix.push(dep_id);
            self.collect_paths_from(dep_id, suffix, out, seen);
            suffix.pop();
        }
    }
}
