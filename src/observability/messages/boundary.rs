// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the invocation boundary.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An invocation ended in a hard failure and was turned into a failure envelope.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InvocationAborted<'a> {
    pub task_type: &'a str,
    pub thread_id: &'a str,
    pub node: Option<&'a str>,
    pub step: Option<usize>,
    pub error: &'a dyn std::error::Error,
    pub elapsed: std::time::Duration,
}

impl Display for InvocationAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Task '{}' aborted", self.task_type)?;
        if let (Some(node), Some(step)) = (self.node, self.step) {
            write!(f, " at node '{}' step {}", node, step)?;
        }
        write!(f, " after {:?}: {}", self.elapsed, self.error)
    }
}

impl StructuredLog for InvocationAborted<'_> {
    fn log(&self) {
        tracing::error!(
            task_type = self.task_type,
            thread_id = self.thread_id,
            node = self.node,
            step = self.step,
            elapsed_ms = self.elapsed.as_millis() as u64,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "invocation_aborted",
            span_name = name,
            task_type = self.task_type,
            thread_id = self.thread_id,
        )
    }
}

/// A task request was dispatched to its workflow.
///
/// # Log Level
/// `debug!`
pub struct TaskDispatched<'a> {
    pub task_type: &'a str,
    pub thread_id: &'a str,
    pub input_size: usize,
}

impl Display for TaskDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatching task '{}' for thread '{}' ({} bytes of input)",
            self.task_type, self.thread_id, self.input_size
        )
    }
}

impl StructuredLog for TaskDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            task_type = self.task_type,
            thread_id = self.thread_id,
            input_size = self.input_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "task",
            span_name = name,
            task_type = self.task_type,
            thread_id = self.thread_id,
        )
    }
}
