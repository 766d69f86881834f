//! DAG execution engine.

use crate::agent::AgentDispatch;
use crate::context::StepOutputs;
use crate::error::{DagError, Result};
use crate::graph::DependencyGraph;
use crate::reference::StepInput;
use crate::scheduler::topological_order;
use crate::step::Step;
use serde_json::Value;
use std::collections::HashMap;

/// A step ready to run: its declaration plus its parsed input.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    /// The declared step
    pub step: Step,

    /// Input with any reference parsed
    pub input: StepInput,
}

/// A validated run: steps in execution order with parsed inputs.
///
/// Building a plan checks everything that can be checked before an agent
/// runs: unique ids, known dependencies, no cycles, and well-formed
/// references.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Name used in logs
    pub name: String,

    /// Dependency graph of the declared steps
    pub graph: DependencyGraph,

    /// Steps in execution order
    pub steps: Vec<PlannedStep>,
}

impl Plan {
    /// Build a plan from step declarations.
    pub fn new(name: &str, steps: &[Step]) -> Result<Self> {
        let graph = DependencyGraph::build(steps)?;
        let order = topological_order(&graph)?;

        let by_id: HashMap<&str, &Step> = steps.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut planned = Vec::with_capacity(order.len());
        for id in &order {
            let step = by_id[id.as_str()];
            planned.push(PlannedStep {
                input: StepInput::parse(&step.input)?,
                step: step.clone(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            graph,
            steps: planned,
        })
    }

    /// Step ids in execution order.
    pub fn order(&self) -> Vec<String> {
        self.steps.iter().map(|p| p.step.id.clone()).collect()
    }
}

/// Result of a DAG run.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Output of every step
    pub outputs: StepOutputs,

    /// Step ids in the order they ran
    pub order: Vec<String>,

    /// Per-step results, in execution order
    pub step_results: Vec<StepResult>,

    /// Total execution time in milliseconds
    pub total_ms: f64,
}

impl ExecutionResult {
    /// Output of a single step.
    pub fn output(&self, step: &str) -> Option<&Value> {
        self.outputs.get(step)
    }

    /// Output of the last step to run.
    pub fn last(&self) -> Option<&Value> {
        self.outputs.last().map(|(_, v)| v)
    }

    /// Consume into the step id to output map.
    pub fn into_outputs(self) -> HashMap<String, Value> {
        self.outputs.into_map()
    }
}

/// Result of a single step execution.
#[derive(Debug)]
pub struct StepResult {
    /// Position in the execution order (0-based)
    pub index: usize,

    /// Step that was executed
    pub step: Step,

    /// Input handed to the agent, after resolution
    pub input: Value,

    /// Output of the step
    pub result: Value,

    /// Execution time in milliseconds
    pub duration_ms: f64,
}

/// Execute a plan.
///
/// Steps run one at a time in plan order. Each step's input is resolved
/// against the outputs recorded so far, then the step is dispatched to its
/// agent. The first failure aborts the run (fail-fast) and no outputs are
/// returned.
///
/// # Example
///
/// ```rust
/// use fgp_dag::{execute, AgentRegistry, Plan, Step};
///
/// let steps = vec![
///     Step::new("greet", "echo").input("hi").build(),
///     Step::new("repeat", "echo").input_from("greet").build(),
/// ];
///
/// let plan = Plan::new("example", &steps)?;
/// let result = execute(&plan, &AgentRegistry::with_builtins())?;
/// assert_eq!(result.output("repeat"), Some(&fgp_dag::Value::from("hi")));
/// # Ok::<(), fgp_dag::DagError>(())
/// ```
pub fn execute<D>(plan: &Plan, dispatch: &D) -> Result<ExecutionResult>
where
    D: AgentDispatch + ?Sized,
{
    tracing::info!(dag = %plan.name, steps = plan.steps.len(), "Starting DAG");

    let start = std::time::Instant::now();
    let mut outputs = StepOutputs::new();
    let mut step_results = Vec::with_capacity(plan.steps.len());

    for (index, planned) in plan.steps.iter().enumerate() {
        let step = &planned.step;
        let step_start = std::time::Instant::now();

        debug_assert!(step.depends_on.iter().all(|d| outputs.contains(d)));

        tracing::debug!(
            step = %step.id,
            agent = %step.agent,
            "Executing step"
        );

        let input = planned.input.resolve(&step.id, &outputs).map_err(|e| {
            tracing::warn!(step = %step.id, error = %e, "Input resolution failed");
            e
        })?;

        let result = dispatch
            .execute(&step.agent, &input, &step.params)
            .map_err(|source| {
                tracing::warn!(step = %step.id, agent = %step.agent, error = %source, "Step failed");
                DagError::AgentExecution {
                    step: step.id.clone(),
                    agent: step.agent.clone(),
                    source,
                }
            })?;

        let step_ms = step_start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(step = %step.id, duration_ms = step_ms, "Step completed");

        outputs.record(&step.id, result.clone())?;

        step_results.push(StepResult {
            index,
            step: step.clone(),
            input,
            result,
            duration_ms: step_ms,
        });
    }

    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(dag = %plan.name, total_ms = total_ms, "DAG completed");

    Ok(ExecutionResult {
        order: plan.order(),
        outputs,
        step_results,
        total_ms,
    })
}

/// Plan and run a list of steps, returning each step's output.
///
/// Fails without any partial outputs if planning or any step fails.
pub fn run_dag<D>(steps: &[Step], dispatch: &D) -> Result<HashMap<String, Value>>
where
    D: AgentDispatch + ?Sized,
{
    let plan = Plan::new("dag", steps)?;
    Ok(execute(&plan, dispatch)?.into_outputs())
}
