//! Topological scheduling (Kahn's algorithm).

use crate::error::{DagError, Result};
use crate::graph::DependencyGraph;
use std::collections::{BTreeSet, VecDeque};

/// Returns step ids in execution order (dependencies before dependents).
///
/// Steps with no ordering constraint between them keep declaration order:
/// the ready queue is seeded in declaration order and dependents are
/// enqueued the moment their last dependency is taken off the queue.
///
/// On a cycle, the error names every step that could never become ready,
/// which includes steps downstream of the cycle.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<String>> {
    // Local copy so callers never observe partially decremented counts
    let mut indegree = graph.indegrees().clone();

    let mut queue: VecDeque<&str> = graph
        .ids()
        .iter()
        .filter(|id| indegree.get(id.as_str()) == Some(&0))
        .map(String::as_str)
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(step) = queue.pop_front() {
        order.push(step.to_string());

        for dependent in graph.dependents_of(step) {
            if let Some(degree) = indegree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if order.len() < graph.len() {
        let nodes: BTreeSet<String> = indegree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id)
            .collect();

        tracing::debug!(unresolved = nodes.len(), "Cycle detected");
        return Err(DagError::CycleDetected { nodes });
    }

    Ok(order)
}
