// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failure reading or writing a checkpoint.
///
/// The in-memory store never fails; durable stores map their backend errors here.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint backend unavailable: {0}")]
    Unavailable(String),

    #[error("checkpoint for thread '{thread_id}' could not be decoded: {reason}")]
    Corrupt { thread_id: String, reason: String },
}
