// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failure reported by the generative text collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    #[error("generator rejected the request: {0}")]
    Rejected(String),

    #[error("generator returned no output")]
    Empty,
}

/// Error returned from a node body.
///
/// A node that wants a soft failure records it in the state instead and returns `Ok`.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A field that every path to this node should have set is missing
    #[error("required state field '{field}' is missing")]
    MissingField { field: &'static str },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("{0}")]
    Failed(String),
}
