// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the invocation lifecycle of a compiled workflow.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Invocation started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct InvocationStarted<'a> {
    pub workflow: &'a str,
    pub thread_id: &'a str,
    pub step_budget: usize,
    pub resumed: bool,
}

impl Display for InvocationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting workflow '{}' for thread '{}' (step_budget={}, resumed={})",
            self.workflow, self.thread_id, self.step_budget, self.resumed
        )
    }
}

impl StructuredLog for InvocationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            thread_id = self.thread_id,
            step_budget = self.step_budget,
            resumed = self.resumed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "invocation",
            span_name = name,
            workflow = self.workflow,
            thread_id = self.thread_id,
            step_budget = self.step_budget,
        )
    }
}

/// A node is about to run.
///
/// # Log Level
/// `debug!` - Per-step detail
pub struct NodeEntered<'a> {
    pub node: &'a str,
    pub step: usize,
}

impl Display for NodeEntered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Entering node '{}' at step {}", self.node, self.step)
    }
}

impl StructuredLog for NodeEntered<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, step = self.step, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node", span_name = name, node = self.node, step = self.step)
    }
}

/// A node body returned an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NodeFailed<'a> {
    pub workflow: &'a str,
    pub thread_id: &'a str,
    pub node: &'a str,
    pub step: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' of workflow '{}' failed at step {}: {}",
            self.node, self.workflow, self.step, self.error
        )
    }
}

impl StructuredLog for NodeFailed<'_> {
    fn log(&self) {
        tracing::error!(
            workflow = self.workflow,
            thread_id = self.thread_id,
            node = self.node,
            step = self.step,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_failed",
            span_name = name,
            thread_id = self.thread_id,
            node = self.node,
            step = self.step,
        )
    }
}

/// A router produced a label its label map does not contain.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RoutingFailed<'a> {
    pub workflow: &'a str,
    pub thread_id: &'a str,
    pub node: &'a str,
    pub label: &'a str,
    pub step: usize,
}

impl Display for RoutingFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Router after node '{}' returned undeclared label '{}' at step {}",
            self.node, self.label, self.step
        )
    }
}

impl StructuredLog for RoutingFailed<'_> {
    fn log(&self) {
        tracing::error!(
            workflow = self.workflow,
            thread_id = self.thread_id,
            node = self.node,
            label = self.label,
            step = self.step,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "routing_failed",
            span_name = name,
            node = self.node,
            label = self.label,
        )
    }
}

/// The step budget ran out before a terminal node was reached.
///
/// # Log Level
/// `warn!` - Normal termination worth noticing
pub struct BudgetExhausted<'a> {
    pub workflow: &'a str,
    pub thread_id: &'a str,
    pub steps: usize,
}

impl Display for BudgetExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow '{}' stopped after exhausting its step budget of {}",
            self.workflow, self.steps
        )
    }
}

impl StructuredLog for BudgetExhausted<'_> {
    fn log(&self) {
        tracing::warn!(
            workflow = self.workflow,
            thread_id = self.thread_id,
            steps = self.steps,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("budget_exhausted", span_name = name, steps = self.steps)
    }
}

/// Invocation reached a normal termination.
///
/// # Log Level
/// `info!` - Important operational event
pub struct InvocationCompleted<'a> {
    pub workflow: &'a str,
    pub thread_id: &'a str,
    pub terminal_reason: &'a str,
    pub steps: usize,
    pub duration: std::time::Duration,
}

impl Display for InvocationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow '{}' finished ({}) in {} steps, {:?}",
            self.workflow, self.terminal_reason, self.steps, self.duration
        )
    }
}

impl StructuredLog for InvocationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            thread_id = self.thread_id,
            terminal_reason = self.terminal_reason,
            steps = self.steps,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "invocation_completed",
            span_name = name,
            workflow = self.workflow,
            steps = self.steps,
            duration = ?self.duration,
        )
    }
}
