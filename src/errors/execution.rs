// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while a compiled workflow is running.

use std::time::Duration;
use thiserror::Error;

use super::{CheckpointError, NodeError};

/// Hard failures of a single `invoke` call.
///
/// Every variant aborts the invocation and leaves the thread's checkpoint untouched.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A router returned a label missing from its label map
    #[error("node '{node}' routed to undeclared label '{label}' at step {step}")]
    Routing {
        node: String,
        label: String,
        step: usize,
    },

    /// A node body returned an error
    #[error("node '{node}' failed at step {step}: {source}")]
    Node {
        node: String,
        step: usize,
        #[source]
        source: NodeError,
    },

    #[error("checkpoint store failure: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl ExecutionError {
    /// Node name and step index the failure happened at, when known.
    pub fn location(&self) -> Option<(&str, usize)> {
        match self {
            ExecutionError::Routing { node, step, .. } | ExecutionError::Node { node, step, .. } => {
                Some((node.as_str(), *step))
            }
            ExecutionError::Checkpoint(_) => None,
        }
    }
}

/// Failures seen by the invocation boundary around `invoke`.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("unknown task type '{0}'")]
    UnknownTask(String),

    #[error("invocation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("invocation was cancelled")]
    Cancelled,

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
