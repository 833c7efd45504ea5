// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for checkpoint reads and writes.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A previous checkpoint was found and handed to the new invocation.
///
/// # Log Level
/// `debug!`
pub struct CheckpointRestored<'a> {
    pub thread_id: &'a str,
}

impl Display for CheckpointRestored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Restored checkpoint for thread '{}'", self.thread_id)
    }
}

impl StructuredLog for CheckpointRestored<'_> {
    fn log(&self) {
        tracing::debug!(thread_id = self.thread_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("checkpoint_restored", span_name = name, thread_id = self.thread_id)
    }
}

/// A checkpoint was written.
///
/// # Log Level
/// `debug!`
pub struct CheckpointWritten<'a> {
    pub thread_id: &'a str,
    pub version: u64,
}

impl Display for CheckpointWritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Wrote checkpoint v{} for thread '{}'",
            self.version, self.thread_id
        )
    }
}

impl StructuredLog for CheckpointWritten<'_> {
    fn log(&self) {
        tracing::debug!(thread_id = self.thread_id, version = self.version, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "checkpoint_written",
            span_name = name,
            thread_id = self.thread_id,
            version = self.version,
        )
    }
}
