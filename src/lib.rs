//! # fgp-dag
//!
//! Dependency-ordered agent pipelines for FGP daemon services.
//!
//! Declare steps with dependencies, and each step runs after everything it
//! depends on, with `${step_id.output}` feeding one step's output into
//! another step's input.
//!
//! ## Quick Start
//!
//! ```rust
//! use fgp_dag::{AgentRegistry, Step, Workflow};
//!
//! let mut agents = AgentRegistry::with_builtins();
//! agents.register("shout", |input: &fgp_dag::Value, _: &fgp_dag::Params| -> anyhow::Result<fgp_dag::Value> {
//!     Ok(input.as_str().unwrap_or_default().to_uppercase().into())
//! });
//!
//! let result = Workflow::new("greeting")
//!     .add(Step::new("greet", "echo").input("hi"))
//!     .add(Step::new("loud", "shout").input_from("greet"))
//!     .run(&agents)?;
//!
//! assert_eq!(result.output("loud"), Some(&fgp_dag::Value::from("HI")));
//! # Ok::<(), fgp_dag::DagError>(())
//! ```
//!
//! ## YAML Definition
//!
//! ```yaml
//! name: p0-digest
//! steps:
//!   - id: fetch
//!     agent: fgp
//!     params:
//!       service: gmail
//!       method: gmail.inbox
//!       limit: 5
//!   - id: save
//!     agent: file_writer
//!     depends_on: [fetch]
//!     input: "${fetch.output}"
//!     params:
//!       path: data/inbox.json
//! ```
//!
//! Steps run strictly one at a time. Any failure aborts the run.

mod agent;
mod context;
mod error;
mod executor;
mod graph;
mod reference;
mod scheduler;
mod step;
mod workflow;
pub mod yaml;

#[cfg(feature = "fgp")]
pub use agent::FgpAgent;
pub use agent::{Agent, AgentDispatch, AgentRegistry, EchoAgent, FileWriterAgent};
pub use context::StepOutputs;
pub use error::{DagError, Result};
pub use executor::{execute, run_dag, ExecutionResult, Plan, PlannedStep, StepResult};
pub use graph::DependencyGraph;
pub use reference::{resolve_input, Property, Reference, StepInput};
pub use scheduler::topological_order;
pub use step::{Params, Step, StepBuilder};
pub use workflow::{Workflow, WorkflowBuilder};
pub use yaml::{parse_yaml, run_file};

/// Re-export common types
pub use serde_json::Value;
