// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::engine::WorkflowState;
use crate::errors::ExecutionError;
use crate::observability::messages::checkpoint::CheckpointRestored;
use crate::observability::messages::engine::{
    BudgetExhausted, InvocationCompleted, InvocationStarted, NodeEntered, NodeFailed, RoutingFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{CheckpointStore, Node, Router};

/// Why an invocation stopped without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalReason {
    /// A terminal node (or an edge to `END`) was reached
    Completed { node: String },
    /// The step budget ran out first
    BudgetExceeded { budget: usize },
}

impl TerminalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalReason::Completed { .. } => "completed",
            TerminalReason::BudgetExceeded { .. } => "budget_exceeded",
        }
    }

    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, TerminalReason::BudgetExceeded { .. })
    }
}

/// Result of a normally terminated invocation.
#[derive(Debug, Clone)]
pub struct Invocation<S> {
    pub state: S,
    pub terminal_reason: TerminalReason,
    /// Node executions performed
    pub steps: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Node(usize),
    End,
}

pub(crate) enum Next<S> {
    Terminal,
    Direct(Target),
    Conditional {
        router: Router<S>,
        labels: HashMap<String, Target>,
    },
}

/// Validated graph with every name resolved to an index.
pub(crate) struct Plan<S> {
    pub(crate) name: String,
    pub(crate) entry: usize,
    pub(crate) names: Vec<String>,
    pub(crate) nodes: Vec<Arc<dyn Node<S>>>,
    pub(crate) next: Vec<Next<S>>,
}

/// An executable workflow bound to a checkpoint store.
///
/// Cloning is cheap and every clone shares the same plan and store, so one instance can
/// serve all concurrent invocations of a task.
pub struct CompiledWorkflow<S> {
    plan: Arc<Plan<S>>,
    checkpointer: Arc<dyn CheckpointStore<S>>,
}

impl<S> Clone for CompiledWorkflow<S> {
    fn clone(&self) -> Self {
        Self {
            plan: Arc::clone(&self.plan),
            checkpointer: Arc::clone(&self.checkpointer),
        }
    }
}

impl<S> fmt::Debug for CompiledWorkflow<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledWorkflow")
            .field("name", &self.plan.name)
            .field("entry", &self.plan.names[self.plan.entry])
            .field("nodes", &self.plan.names)
            .finish()
    }
}

impl<S: WorkflowState> CompiledWorkflow<S> {
    pub(crate) fn new(plan: Plan<S>, checkpointer: Arc<dyn CheckpointStore<S>>) -> Self {
        Self {
            plan: Arc::new(plan),
            checkpointer,
        }
    }

    pub fn name(&self) -> &str {
        &self.plan.name
    }

    pub fn entry(&self) -> &str {
        &self.plan.names[self.plan.entry]
    }

    pub fn node_names(&self) -> &[String] {
        &self.plan.names
    }

    pub fn checkpointer(&self) -> &Arc<dyn CheckpointStore<S>> {
        &self.checkpointer
    }

    /// Run the workflow for `thread_id` starting from `initial_state`.
    ///
    /// If the thread already has a checkpoint, `initial_state.carry_over` sees it before
    /// the entry node runs. At most `step_budget` nodes execute. The checkpoint is written
    /// once, after a normal termination; on error nothing is written and the partial
    /// state is dropped.
    ///
    /// # Errors
    ///
    /// * [`ExecutionError::Node`] - a node body failed; the error is passed through
    /// * [`ExecutionError::Routing`] - a router returned a label its map does not declare
    /// * [`ExecutionError::Checkpoint`] - the store could not be read or written
    pub async fn invoke(
        &self,
        initial_state: S,
        thread_id: &str,
        step_budget: usize,
    ) -> Result<Invocation<S>, ExecutionError> {
        let started = Instant::now();
        let mut state = initial_state;

        let previous = self.checkpointer.get(thread_id).await?;
        let resumed = previous.is_some();
        if let Some(previous) = previous {
            CheckpointRestored { thread_id }.log();
            state.carry_over(&previous);
        }

        let start_msg = InvocationStarted {
            workflow: &self.plan.name,
            thread_id,
            step_budget,
            resumed,
        };
        let span = start_msg.span("invoke");
        start_msg.log();

        let invocation = self
            .walk(state, thread_id, step_budget)
            .instrument(span)
            .await?;

        self.checkpointer
            .put(thread_id, invocation.state.clone())
            .await?;

        InvocationCompleted {
            workflow: &self.plan.name,
            thread_id,
            terminal_reason: invocation.terminal_reason.as_str(),
            steps: invocation.steps,
            duration: started.elapsed(),
        }
        .log();

        Ok(invocation)
    }

    async fn walk(
        &self,
        mut state: S,
        thread_id: &str,
        step_budget: usize,
    ) -> Result<Invocation<S>, ExecutionError> {
        let plan = &self.plan;
        let mut current = plan.entry;
        let mut steps = 0usize;

        let terminal_reason = loop {
            if steps >= step_budget {
                BudgetExhausted {
                    workflow: &plan.name,
                    thread_id,
                    steps,
                }
                .log();
                break TerminalReason::BudgetExceeded {
                    budget: step_budget,
                };
            }

            let name = &plan.names[current];
            let step = steps;
            NodeEntered { node: name, step }.log();

            state.record_visit(name);
            state = match plan.nodes[current].run(state).await {
                Ok(next_state) => next_state,
                Err(source) => {
                    NodeFailed {
                        workflow: &plan.name,
                        thread_id,
                        node: name,
                        step,
                        error: &source,
                    }
                    .log();
                    return Err(ExecutionError::Node {
                        node: name.clone(),
                        step,
                        source,
                    });
                }
            };
            steps += 1;

            let target = match &plan.next[current] {
                Next::Terminal => Target::End,
                Next::Direct(target) => *target,
                Next::Conditional { router, labels } => {
                    let label = router(&state);
                    match labels.get(&label) {
                        Some(target) => *target,
                        None => {
                            RoutingFailed {
                                workflow: &plan.name,
                                thread_id,
                                node: name,
                                label: &label,
                                step,
                            }
                            .log();
                            return Err(ExecutionError::Routing {
                                node: name.clone(),
                                label,
                                step,
                            });
                        }
                    }
                }
            };

            match target {
                Target::Node(index) => current = index,
                Target::End => {
                    break TerminalReason::Completed { node: name.clone() };
                }
            }
        };

        Ok(Invocation {
            state,
            terminal_reason,
            steps,
        })
    }
}
