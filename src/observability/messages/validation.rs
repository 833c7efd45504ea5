// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow compilation.

use crate::errors::DefinitionError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A workflow definition compiled cleanly.
///
/// # Log Level
/// `debug!` - Startup detail
pub struct WorkflowCompiled<'a> {
    pub workflow: &'a str,
    pub node_count: usize,
    pub entry: &'a str,
}

impl Display for WorkflowCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled workflow '{}': {} nodes, entry '{}'",
            self.workflow, self.node_count, self.entry
        )
    }
}

impl StructuredLog for WorkflowCompiled<'_> {
    fn log(&self) {
        tracing::debug!(
            workflow = self.workflow,
            node_count = self.node_count,
            entry = self.entry,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("compile", span_name = name, workflow = self.workflow)
    }
}

/// A workflow definition was rejected by the compiler.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use lessonflow::errors::DefinitionError;
/// use lessonflow::observability::messages::validation::DefinitionRejected;
///
/// let errors = vec![DefinitionError::MissingEntry];
/// let msg = DefinitionRejected {
///     workflow: "chat",
///     errors: &errors,
/// };
///
/// assert!(msg.to_string().contains("no entry node"));
/// ```
pub struct DefinitionRejected<'a> {
    pub workflow: &'a str,
    pub errors: &'a [DefinitionError],
}

impl Display for DefinitionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Workflow '{}' rejected: ", self.workflow)?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl StructuredLog for DefinitionRejected<'_> {
    fn log(&self) {
        tracing::error!(
            workflow = self.workflow,
            error_count = self.errors.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "definition_rejected",
            span_name = name,
            workflow = self.workflow,
            error_count = self.errors.len(),
        )
    }
}
