// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured output recovery.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A value was recovered from generated text.
///
/// # Log Level
/// `debug!` - Per-call detail
pub struct OutputRecovered<'a> {
    pub strategy: &'a str,
    pub shape: &'a str,
    pub input_size: usize,
}

impl Display for OutputRecovered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Recovered JSON {} from {} bytes via {}",
            self.shape, self.input_size, self.strategy
        )
    }
}

impl StructuredLog for OutputRecovered<'_> {
    fn log(&self) {
        tracing::debug!(
            strategy = self.strategy,
            shape = self.shape,
            input_size = self.input_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("output_recovered", span_name = name, strategy = self.strategy)
    }
}

/// Every recovery strategy failed.
///
/// # Log Level
/// `debug!` - The caller decides whether this matters
pub struct OutputUnrecoverable<'a> {
    pub shape: &'a str,
    pub input_size: usize,
    pub reason: &'a str,
}

impl Display for OutputUnrecoverable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No JSON {} recoverable from {} bytes: {}",
            self.shape, self.input_size, self.reason
        )
    }
}

impl StructuredLog for OutputUnrecoverable<'_> {
    fn log(&self) {
        tracing::debug!(
            shape = self.shape,
            input_size = self.input_size,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("output_unrecoverable", span_name = name, shape = self.shape)
    }
}
