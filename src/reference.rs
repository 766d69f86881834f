//! Step input references.
//!
//! A step's input is either a literal value or a placeholder of the form
//! `${step_id.output}` that stands for a prior step's recorded output.
//! Placeholders are parsed once into a [`StepInput`] when a run is planned;
//! resolution then only deals with typed references.

use crate::context::StepOutputs;
use crate::error::{DagError, Result};
use serde_json::Value;
use std::fmt;

/// Property of a step that a reference can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// The step's full recorded output.
    Output,
}

impl Property {
    fn parse(token: &str, reference: &str) -> Result<Self> {
        match token {
            "output" => Ok(Property::Output),
            other => Err(DagError::UnsupportedReference {
                reference: reference.to_string(),
                property: other.to_string(),
            }),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Property::Output => "output",
        }
    }
}

/// A parsed `${step_id.property}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Step whose output is referenced.
    pub step: String,
    /// Property being read.
    pub property: Property,
}

impl Reference {
    /// Parse a placeholder string.
    ///
    /// Returns `Ok(None)` when the string is not wrapped in `${` `}` and is
    /// therefore a literal.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let Some(body) = raw
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        else {
            return Ok(None);
        };

        let invalid = || DagError::InvalidReferenceFormat {
            reference: raw.to_string(),
        };

        let mut parts = body.split('.');
        let (step, property) = match (parts.next(), parts.next(), parts.next()) {
            (Some(step), Some(property), None) => (step, property),
            _ => return Err(invalid()),
        };

        if !is_identifier(step) || !is_identifier(property) {
            return Err(invalid());
        }

        Ok(Some(Self {
            step: step.to_string(),
            property: Property::parse(property, raw)?,
        }))
    }

    /// Look up the referenced value in the outputs recorded so far.
    ///
    /// `requester` is the step whose input is being resolved.
    pub fn resolve(&self, requester: &str, outputs: &StepOutputs) -> Result<Value> {
        match self.property {
            Property::Output => outputs.get(&self.step).cloned().ok_or_else(|| {
                DagError::UnresolvedDependency {
                    step: requester.to_string(),
                    dependency: self.step.clone(),
                }
            }),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}.{}}}", self.step, self.property.as_str())
    }
}

/// A step input after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// Passed to the agent unchanged.
    Literal(Value),
    /// Replaced by a prior step's output.
    Ref(Reference),
}

impl StepInput {
    /// Parse a raw input value.
    pub fn parse(raw: &Value) -> Result<Self> {
        if let Value::String(s) = raw {
            if let Some(reference) = Reference::parse(s)? {
                return Ok(StepInput::Ref(reference));
            }
        }
        Ok(StepInput::Literal(raw.clone()))
    }

    /// Produce the value to hand to the agent.
    pub fn resolve(&self, requester: &str, outputs: &StepOutputs) -> Result<Value> {
        match self {
            StepInput::Literal(value) => Ok(value.clone()),
            StepInput::Ref(reference) => reference.resolve(requester, outputs),
        }
    }

    /// The referenced step, if any.
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            StepInput::Ref(reference) => Some(reference),
            StepInput::Literal(_) => None,
        }
    }
}

/// Parse and resolve a raw input in one go.
pub fn resolve_input(requester: &str, raw: &Value, outputs: &StepOutputs) -> Result<Value> {
    StepInput::parse(raw)?.resolve(requester, outputs)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
