//! YAML workflow parser.

use crate::agent::AgentDispatch;
use crate::Workflow;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Parse a workflow from YAML string.
///
/// # Example
///
/// ```rust
/// use fgp_dag::parse_yaml;
///
/// let yaml = r#"
/// name: p0-digest
/// steps:
///   - id: fetch
///     agent: gmail_reader
///   - id: extract
///     agent: gpt_task_extractor
///     depends_on: [fetch]
///     input: "${fetch.output}"
/// "#;
///
/// let workflow = parse_yaml(yaml).unwrap();
/// assert_eq!(workflow.name, "p0-digest");
/// assert_eq!(workflow.steps.len(), 2);
/// ```
pub fn parse_yaml(yaml: &str) -> Result<Workflow> {
    let workflow: Workflow = serde_yaml::from_str(yaml).context("Failed to parse workflow YAML")?;

    validate(&workflow)?;

    Ok(workflow)
}

/// Load and parse a workflow from a YAML file.
///
/// # Arguments
/// * `path` - Path to the YAML file
///
/// # Example
///
/// ```rust,no_run
/// use fgp_dag::yaml::load_file;
///
/// let workflow = load_file("p0_digest.yaml")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_file(path: impl AsRef<Path>) -> Result<Workflow> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow file: {}", path.display()))?;

    parse_yaml(&content)
        .with_context(|| format!("Failed to parse workflow file: {}", path.display()))
}

/// Load a workflow file and run it, returning each step's output.
///
/// Planning and execution errors are [`crate::DagError`]s and can be
/// recovered with `downcast_ref`.
pub fn run_file<D>(path: impl AsRef<Path>, dispatch: &D) -> Result<HashMap<String, Value>>
where
    D: AgentDispatch + ?Sized,
{
    let path = path.as_ref();
    let workflow = load_file(path)?;
    let result = workflow
        .run(dispatch)
        .with_context(|| format!("Workflow '{}' failed", workflow.name))?;
    Ok(result.into_outputs())
}

/// Validate a workflow.
fn validate(workflow: &Workflow) -> Result<()> {
    if workflow.name.is_empty() {
        anyhow::bail!("Workflow name cannot be empty");
    }

    if workflow.steps.is_empty() {
        anyhow::bail!("Workflow must have at least one step");
    }

    for (i, step) in workflow.steps.iter().enumerate() {
        if step.id.is_empty() {
            anyhow::bail!("Step {} has empty id", i);
        }
        if step.agent.is_empty() {
            anyhow::bail!("Step {} ({}) has empty agent name", i, step.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_workflow() {
        let yaml = r#"
name: test-workflow
description: A test workflow
steps:
  - id: fetch
    agent: gmail_reader
    params:
      limit: 10
"#;

        let workflow = parse_yaml(yaml).unwrap();
        assert_eq!(workflow.name, "test-workflow");
        assert_eq!(workflow.description, Some("A test workflow".to_string()));
        assert_eq!(workflow.steps.len(), 1);
        assert_eq!(workflow.steps[0].id, "fetch");
        assert_eq!(workflow.steps[0].agent, "gmail_reader");
        assert_eq!(workflow.steps[0].params.get("limit"), Some(&json!(10)));
        assert_eq!(workflow.steps[0].input, json!(""));
    }

    #[test]
    fn test_parse_multi_step_workflow() {
        let yaml = r#"
steps:
  - id: fetch
    agent: gmail_reader
  - id: extract_p0
    agent: gpt_task_extractor
    depends_on: [fetch]
    input: "${fetch.output}"
  - id: write
    agent: file_writer
    depends_on:
      - extract_p0
    input: "${extract_p0.output}"
    params:
      path: data/p0_digest_summary.txt
"#;

        let workflow = parse_yaml(yaml).unwrap();
        assert_eq!(workflow.name, "workflow");
        assert_eq!(workflow.steps.len(), 3);
        assert_eq!(workflow.steps[2].depends_on, vec!["extract_p0".to_string()]);
        assert_eq!(workflow.steps[2].input, json!("${extract_p0.output}"));
    }

    #[test]
    fn test_structured_literal_input() {
        let yaml = r#"
steps:
  - id: notify
    agent: discord_notifier
    input:
      topic: Daily digest
      lines: [a, b]
"#;

        let workflow = parse_yaml(yaml).unwrap();
        assert_eq!(
            workflow.steps[0].input,
            json!({"topic": "Daily digest", "lines": ["a", "b"]})
        );
    }

    #[test]
    fn test_validate_empty_name() {
        let yaml = r#"
name: ""
steps:
  - id: a
    agent: echo
"#;

        let result = parse_yaml(yaml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("name cannot be empty"));
    }

    #[test]
    fn test_validate_no_steps() {
        let yaml = r#"
name: empty-workflow
steps: []
"#;

        let result = parse_yaml(yaml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least one step"));
    }

    #[test]
    fn test_validate_empty_agent() {
        let yaml = r#"
steps:
  - id: a
    agent: ""
"#;

        let err = parse_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("empty agent name"));
    }

    #[test]
    fn test_missing_agent_field() {
        let yaml = r#"
steps:
  - id: a
"#;

        assert!(parse_yaml(yaml).is_err());
    }
}
