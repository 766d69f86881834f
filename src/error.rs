//! Error types for DAG planning and execution.
//!
//! Every failure carries the identifiers needed to render a precise
//! diagnostic (step id, dependency id, or the unresolved node set).
//!
//! - Structural errors (`ReferentialIntegrity`, `DuplicateStep`,
//!   `CycleDetected`) are raised while planning, before any agent runs.
//! - Reference errors are raised while parsing or resolving step inputs.
//! - Agent failures are wrapped in `AgentExecution` with the cause kept as
//!   the error source.

use std::collections::BTreeSet;
use thiserror::Error;

/// Core error type for DAG runs.
#[derive(Debug, Error)]
pub enum DagError {
    /// A `depends_on` entry names a step that was never declared.
    #[error("Step '{step}' depends on unknown step '{missing}'")]
    ReferentialIntegrity { step: String, missing: String },

    /// Two steps share the same id.
    #[error("Duplicate step id '{id}'")]
    DuplicateStep { id: String },

    /// The dependency graph contains at least one cycle.
    #[error("Cycle detected among steps: {}", join(.nodes))]
    CycleDetected { nodes: BTreeSet<String> },

    /// Input looks like `${...}` but is not `${step.property}`.
    #[error("Invalid reference format: '{reference}' (expected ${{step_id.output}})")]
    InvalidReferenceFormat { reference: String },

    /// Reference names a property other than `output`.
    #[error("Unsupported reference property '{property}' in '{reference}'")]
    UnsupportedReference { reference: String, property: String },

    /// Reference points at a step that has not produced an output yet.
    #[error("Step '{step}' references '{dependency}', which has no recorded output")]
    UnresolvedDependency { step: String, dependency: String },

    /// No agent is registered under this name.
    #[error("Unknown agent: {agent}")]
    AgentNotFound { agent: String },

    /// An agent failed while running a step.
    #[error("Step '{step}' failed in agent '{agent}'")]
    AgentExecution {
        step: String,
        agent: String,
        #[source]
        source: anyhow::Error,
    },

    /// A step's output was written twice.
    #[error("Output for step '{step}' was already recorded")]
    OutputAlreadyRecorded { step: String },
}

/// Result type alias for DAG operations.
pub type Result<T> = std::result::Result<T, DagError>;

fn join(nodes: &BTreeSet<String>) -> String {
    nodes.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
