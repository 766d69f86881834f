//! Step outputs recorded during a run.

use crate::error::{DagError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Outputs of completed steps, keyed by step id.
///
/// A step id is present if and only if that step has completed. Each entry
/// is written once; outputs are never replaced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepOutputs {
    values: HashMap<String, Value>,

    /// Step ids in completion order
    completed: Vec<String>,
}

impl StepOutputs {
    /// Create an empty output map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step's output.
    pub fn record(&mut self, step: &str, value: Value) -> Result<()> {
        if self.values.contains_key(step) {
            return Err(DagError::OutputAlreadyRecorded {
                step: step.to_string(),
            });
        }
        self.values.insert(step.to_string(), value);
        self.completed.push(step.to_string());
        Ok(())
    }

    /// Get a step's output.
    pub fn get(&self, step: &str) -> Option<&Value> {
        self.values.get(step)
    }

    /// Whether the step has completed.
    pub fn contains(&self, step: &str) -> bool {
        self.values.contains_key(step)
    }

    /// Number of completed steps.
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    /// Whether no step has completed yet.
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Output of the most recently completed step.
    pub fn last(&self) -> Option<(&str, &Value)> {
        let step = self.completed.last()?;
        self.values.get(step).map(|v| (step.as_str(), v))
    }

    /// Iterate outputs in completion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.completed
            .iter()
            .filter_map(|id| self.values.get(id).map(|v| (id.as_str(), v)))
    }

    /// Consume into a plain map.
    pub fn into_map(self) -> HashMap<String, Value> {
        self.values
    }

    /// All outputs as a JSON object.
    pub fn as_json(&self) -> Value {
        let mut data = Map::new();
        for (k, v) in self.iter() {
            data.insert(k.to_string(), v.clone());
        }
        Value::Object(data)
    }
}
