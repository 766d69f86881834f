//! Agents and dispatch by name.
//!
//! An [`Agent`] performs one step's work: it takes the resolved input and
//! the step's parameters and returns an output value. The execution loop
//! only sees the [`AgentDispatch`] trait, so agents can be registered in an
//! [`AgentRegistry`] or supplied any other way.

use crate::error::DagError;
use crate::step::Params;
use anyhow::{Context as _, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A handler that performs a step's work.
pub trait Agent: Send + Sync {
    /// Run the agent.
    fn run(&self, input: &Value, params: &Params) -> Result<Value>;
}

impl<F> Agent for F
where
    F: Fn(&Value, &Params) -> Result<Value> + Send + Sync,
{
    fn run(&self, input: &Value, params: &Params) -> Result<Value> {
        self(input, params)
    }
}

/// Runs an agent by name.
pub trait AgentDispatch {
    /// Run `agent` with an input and parameters.
    ///
    /// Fails with [`DagError::AgentNotFound`] when the name is unknown, or
    /// with the agent's own error.
    fn execute(&self, agent: &str, input: &Value, params: &Params) -> Result<Value>;
}

/// Registry of named agents.
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in agents registered.
    ///
    /// - `echo`: returns its input unchanged
    /// - `file_writer`: writes its input to `params.path`
    /// - `fgp`: calls an FGP daemon method (feature `fgp`)
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("echo", EchoAgent);
        registry.register("file_writer", FileWriterAgent);
        #[cfg(feature = "fgp")]
        registry.register("fgp", FgpAgent);
        registry
    }

    /// Register an agent, replacing any agent with the same name.
    pub fn register(&mut self, name: &str, agent: impl Agent + 'static) -> &mut Self {
        self.agents.insert(name.to_string(), Arc::new(agent));
        self
    }

    /// Get an agent by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    /// Whether an agent is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Registered agent names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}

impl AgentDispatch for AgentRegistry {
    fn execute(&self, agent: &str, input: &Value, params: &Params) -> Result<Value> {
        let handler = self.get(agent).ok_or_else(|| DagError::AgentNotFound {
            agent: agent.to_string(),
        })?;
        handler.run(input, params)
    }
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAgent;

impl Agent for EchoAgent {
    fn run(&self, input: &Value, _params: &Params) -> Result<Value> {
        Ok(input.clone())
    }
}

/// Writes its input to the file named by the `path` parameter.
///
/// String inputs are written as-is; anything else is written as pretty JSON.
/// Parent directories are created as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileWriterAgent;

impl Agent for FileWriterAgent {
    fn run(&self, input: &Value, params: &Params) -> Result<Value> {
        let path = params
            .get("path")
            .and_then(Value::as_str)
            .context("file_writer requires a string 'path' parameter")?;
        let path = Path::new(path);

        let content = match input {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Wrote step output");

        Ok(Value::String(format!("written to {}", path.display())))
    }
}

/// Calls a method on an FGP daemon service.
///
/// Parameters `service` and `method` select the call; every other parameter
/// is forwarded, and a non-empty input is passed as `input`.
#[cfg(feature = "fgp")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FgpAgent;

#[cfg(feature = "fgp")]
impl Agent for FgpAgent {
    fn run(&self, input: &Value, params: &Params) -> Result<Value> {
        let service = params
            .get("service")
            .and_then(Value::as_str)
            .context("fgp agent requires a string 'service' parameter")?;
        let method = params
            .get("method")
            .and_then(Value::as_str)
            .context("fgp agent requires a string 'method' parameter")?;

        let call_params = fgp_call_params(input, params);

        // Auto-start the daemon, as workflows do
        let response = fgp_daemon::client::call_auto_start(service, method, call_params)
            .with_context(|| format!("Call to {}.{} failed", service, method))?;

        if !response.ok {
            let error = response.error.map(|e| e.message).unwrap_or_default();
            anyhow::bail!("{}.{} returned error: {}", service, method, error);
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

#[cfg_attr(not(feature = "fgp"), allow(dead_code))]
fn fgp_call_params(input: &Value, params: &Params) -> Value {
    let mut call = serde_json::Map::new();
    for (k, v) in params {
        if k != "service" && k != "method" {
            call.insert(k.clone(), v.clone());
        }
    }
    let empty = match input {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if !empty {
        call.insert("input".to_string(), input.clone());
    }
    Value::Object(call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_dispatches_by_name() {
        let mut registry = AgentRegistry::new();
        registry.register("upper", |input: &Value, _: &Params| -> Result<Value> {
            Ok(Value::String(input.as_str().unwrap_or_default().to_uppercase()))
        });

        let output = registry
            .execute("upper", &json!("hi"), &Params::new())
            .unwrap();
        assert_eq!(output, json!("HI"));
    }

    #[test]
    fn test_unknown_agent() {
        let registry = AgentRegistry::new();
        let err = registry
            .execute("ghost", &json!(""), &Params::new())
            .unwrap_err();

        match err.downcast_ref::<DagError>() {
            Some(DagError::AgentNotFound { agent }) => assert_eq!(agent, "ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_builtins() {
        let registry = AgentRegistry::with_builtins();
        assert!(registry.contains("echo"));
        assert!(registry.contains("file_writer"));

        let output = registry
            .execute("echo", &json!({"n": 1}), &Params::new())
            .unwrap();
        assert_eq!(output, json!({"n": 1}));
    }

    #[test]
    fn test_file_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("digest.txt");

        let mut params = Params::new();
        params.insert("path".to_string(), json!(path.to_str().unwrap()));

        let output = FileWriterAgent.run(&json!("- ship release"), &params).unwrap();
        assert!(output.as_str().unwrap().contains("digest.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "- ship release");
    }

    #[test]
    fn test_file_writer_requires_path() {
        let err = FileWriterAgent.run(&json!("x"), &Params::new()).unwrap_err();
        assert!(err.to_string().contains("'path'"));
    }

    #[test]
    fn test_fgp_call_params() {
        let mut params = Params::new();
        params.insert("service".to_string(), json!("gmail"));
        params.insert("method".to_string(), json!("gmail.inbox"));
        params.insert("limit".to_string(), json!(5));

        assert_eq!(
            fgp_call_params(&json!("query"), &params),
            json!({"limit": 5, "input": "query"})
        );
        assert_eq!(fgp_call_params(&json!(""), &params), json!({"limit": 5}));
    }
}
