//! Workflow definition and builder.

use crate::agent::AgentDispatch;
use crate::error::Result;
use crate::executor::{execute, ExecutionResult, Plan};
use crate::step::{Step, StepBuilder};
use serde::{Deserialize, Serialize};

/// A named DAG of steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow name
    #[serde(default = "default_name")]
    pub name: String,

    /// Description of what this workflow does
    #[serde(default)]
    pub description: Option<String>,

    /// Step declarations, in declaration order
    pub steps: Vec<Step>,
}

fn default_name() -> String {
    "workflow".to_string()
}

impl Workflow {
    /// Create a new workflow with a name.
    pub fn new(name: &str) -> WorkflowBuilder {
        WorkflowBuilder::new(name)
    }

    /// Create an empty workflow.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// Validate the workflow and compute its execution order.
    pub fn plan(&self) -> Result<Plan> {
        Plan::new(&self.name, &self.steps)
    }

    /// Execute this workflow.
    pub fn run<D>(&self, dispatch: &D) -> Result<ExecutionResult>
    where
        D: AgentDispatch + ?Sized,
    {
        execute(&self.plan()?, dispatch)
    }
}

/// Builder for creating workflows.
#[derive(Debug, Clone)]
pub struct WorkflowBuilder {
    workflow: Workflow,
}

impl WorkflowBuilder {
    /// Create a new workflow builder.
    pub fn new(name: &str) -> Self {
        Self {
            workflow: Workflow::empty(name),
        }
    }

    /// Set the workflow description.
    pub fn description(mut self, desc: &str) -> Self {
        self.workflow.description = Some(desc.to_string());
        self
    }

    /// Add a step to the workflow.
    pub fn add<S: Into<Step>>(mut self, step: S) -> Self {
        self.workflow.steps.push(step.into());
        self
    }

    /// Add a step builder (convenience).
    pub fn step(self, step: StepBuilder) -> Self {
        self.add(step.build())
    }

    /// Build the workflow.
    pub fn build(self) -> Workflow {
        self.workflow
    }

    /// Execute the workflow.
    pub fn run<D>(self, dispatch: &D) -> Result<ExecutionResult>
    where
        D: AgentDispatch + ?Sized,
    {
        self.build().run(dispatch)
    }
}

impl From<WorkflowBuilder> for Workflow {
    fn from(builder: WorkflowBuilder) -> Self {
        builder.build()
    }
}
