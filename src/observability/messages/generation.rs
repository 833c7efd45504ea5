// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for calls to the text generator.

use crate::errors::GenerationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A generation attempt failed or returned nothing.
///
/// # Log Level
/// `warn!` - The workflow may still retry
pub struct GenerationFailed<'a> {
    pub generator: &'a str,
    pub attempt: u32,
    pub error: &'a GenerationError,
}

impl Display for GenerationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generator '{}' failed on attempt {}: {}",
            self.generator, self.attempt, self.error
        )
    }
}

impl StructuredLog for GenerationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            generator = self.generator,
            attempt = self.attempt,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("generation_failed", span_name = name, generator = self.generator)
    }
}
