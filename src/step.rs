//! Step declarations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Parameters passed to an agent alongside its input.
pub type Params = HashMap<String, Value>;

/// A single step in a DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique step id (e.g., "fetch_emails")
    pub id: String,

    /// Agent that performs the step (e.g., "gmail_reader")
    pub agent: String,

    /// Steps that must complete before this one
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Literal input, or a `${step_id.output}` reference
    #[serde(default = "empty_input")]
    pub input: Value,

    /// Parameters passed to the agent
    #[serde(default)]
    pub params: Params,

    /// Description for logging/debugging
    #[serde(default)]
    pub description: Option<String>,
}

fn empty_input() -> Value {
    Value::String(String::new())
}

impl Step {
    /// Create a new step with an id and the agent that runs it.
    pub fn new(id: &str, agent: &str) -> StepBuilder {
        StepBuilder::new(id, agent)
    }
}

/// Builder for creating steps.
#[derive(Debug, Clone)]
pub struct StepBuilder {
    step: Step,
}

impl StepBuilder {
    /// Create a new step builder.
    pub fn new(id: &str, agent: &str) -> Self {
        Self {
            step: Step {
                id: id.to_string(),
                agent: agent.to_string(),
                depends_on: Vec::new(),
                input: empty_input(),
                params: Params::new(),
                description: None,
            },
        }
    }

    /// Add a dependency.
    pub fn depends_on(mut self, step_id: &str) -> Self {
        self.step.depends_on.push(step_id.to_string());
        self
    }

    /// Set a literal input.
    pub fn input<V: Into<Value>>(mut self, value: V) -> Self {
        self.step.input = value.into();
        self
    }

    /// Feed another step's output into this step.
    ///
    /// Records the dependency and sets the input to `${step_id.output}`.
    pub fn input_from(mut self, step_id: &str) -> Self {
        if !self.step.depends_on.iter().any(|d| d == step_id) {
            self.step.depends_on.push(step_id.to_string());
        }
        self.step.input = Value::String(format!("${{{}.output}}", step_id));
        self
    }

    /// Add a parameter.
    pub fn with_param<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.step.params.insert(key.to_string(), value.into());
        self
    }

    /// Add all parameters from a JSON value.
    pub fn with_params(mut self, params: Value) -> Self {
        if let Value::Object(map) = params {
            for (k, v) in map {
                self.step.params.insert(k, v);
            }
        }
        self
    }

    /// Set a description.
    pub fn description(mut self, desc: &str) -> Self {
        self.step.description = Some(desc.to_string());
        self
    }

    /// Build the step.
    pub fn build(self) -> Step {
        self.step
    }
}

impl From<StepBuilder> for Step {
    fn from(builder: StepBuilder) -> Self {
        builder.build()
    }
}
