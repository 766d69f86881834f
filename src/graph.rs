//! Dependency graph construction.

use crate::error::{DagError, Result};
use crate::step::Step;
use std::collections::{HashMap, HashSet};

/// Forward edges and indegree counts for a list of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyGraph {
    /// Step ids in declaration order.
    ids: Vec<String>,

    /// Map of step id to the steps that depend on it.
    dependents: HashMap<String, Vec<String>>,

    /// Map of step id to its number of dependencies.
    indegree: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Build the graph from step declarations.
    ///
    /// Every dependency adds one edge `dep -> step`. Steps without
    /// dependencies get an indegree of 0. Fails if a step id is declared
    /// twice or a dependency names an undeclared step.
    pub fn build(steps: &[Step]) -> Result<Self> {
        let mut ids = Vec::with_capacity(steps.len());
        let mut declared = HashSet::with_capacity(steps.len());
        for step in steps {
            if !declared.insert(step.id.as_str()) {
                return Err(DagError::DuplicateStep {
                    id: step.id.clone(),
                });
            }
            ids.push(step.id.clone());
        }

        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        let mut indegree: HashMap<String, usize> = HashMap::with_capacity(steps.len());

        for step in steps {
            let mut seen = HashSet::new();
            let mut count = 0;
            for dep in &step.depends_on {
                if !declared.contains(dep.as_str()) {
                    return Err(DagError::ReferentialIntegrity {
                        step: step.id.clone(),
                        missing: dep.clone(),
                    });
                }
                // depends_on is a set
                if !seen.insert(dep.as_str()) {
                    continue;
                }
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(step.id.clone());
                count += 1;
            }
            indegree.insert(step.id.clone(), count);
        }

        Ok(Self {
            ids,
            dependents,
            indegree,
        })
    }

    /// Step ids in declaration order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Steps that depend directly on `step`, in declaration order.
    pub fn dependents_of(&self, step: &str) -> &[String] {
        self.dependents.get(step).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of dependencies of `step`.
    pub fn indegree(&self, step: &str) -> Option<usize> {
        self.indegree.get(step).copied()
    }

    /// Indegree counts for every step.
    pub fn indegrees(&self) -> &HashMap<String, usize> {
        &self.indegree
    }

    /// Number of steps in the graph.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the graph has no steps.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(decls: &[(&str, &[&str])]) -> Vec<Step> {
        decls
            .iter()
            .map(|(id, deps)| {
                deps.iter()
                    .fold(Step::new(id, "echo"), |b, d| b.depends_on(d))
                    .build()
            })
            .collect()
    }

    #[test]
    fn test_edges_and_indegree() {
        let graph = DependencyGraph::build(&steps(&[
            ("fetch", &[]),
            ("extract", &["fetch"]),
            ("summarize", &["extract", "fetch"]),
        ]))
        .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.indegree("fetch"), Some(0));
        assert_eq!(graph.indegree("extract"), Some(1));
        assert_eq!(graph.indegree("summarize"), Some(2));
        assert_eq!(graph.dependents_of("fetch"), ["extract", "summarize"]);
        assert_eq!(graph.dependents_of("extract"), ["summarize"]);
        assert!(graph.dependents_of("summarize").is_empty());
    }

    #[test]
    fn test_unknown_dependency() {
        let err = DependencyGraph::build(&steps(&[("a", &[]), ("b", &["ghost"])])).unwrap_err();
        match err {
            DagError::ReferentialIntegrity { step, missing } => {
                assert_eq!(step, "b");
                assert_eq!(missing, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_forward_reference_is_allowed() {
        let graph = DependencyGraph::build(&steps(&[("b", &["a"]), ("a", &[])])).unwrap();
        assert_eq!(graph.ids(), ["b", "a"]);
        assert_eq!(graph.indegree("b"), Some(1));
    }

    #[test]
    fn test_duplicate_step_id() {
        let err = DependencyGraph::build(&steps(&[("a", &[]), ("a", &[])])).unwrap_err();
        assert!(matches!(err, DagError::DuplicateStep { ref id } if id == "a"));
    }

    #[test]
    fn test_repeated_dependency_counts_once() {
        let graph = DependencyGraph::build(&steps(&[("a", &[]), ("b", &["a", "a"])])).unwrap();
        assert_eq!(graph.indegree("b"), Some(1));
        assert_eq!(graph.dependents_of("a"), ["b"]);
    }
}
