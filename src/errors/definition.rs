// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors that can occur while compiling a workflow definition
#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionError {
    /// No entry node was set
    MissingEntry,
    /// The entry node names a node that was never registered
    UnknownEntry {
        entry: String,
    },
    /// A node name was registered more than once
    DuplicateNode {
        node: String,
    },
    /// An edge or label map references a node that does not exist
    UndeclaredNode {
        /// The node the edge leaves from
        from: String,
        /// The missing node
        missing: String,
    },
    /// A node cannot be reached from the entry node
    UnreachableNode {
        node: String,
    },
    /// A node declares more than one unconditional edge
    FanOut {
        node: String,
        targets: Vec<String>,
    },
    /// A node declares both an unconditional and a conditional edge
    ConflictingEdges {
        node: String,
    },
    /// A conditional edge has no labels to route to
    EmptyLabelMap {
        node: String,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::MissingEntry => write!(f, "Workflow has no entry node"),
            DefinitionError::UnknownEntry { entry } => {
                write!(f, "Entry node '{}' is not a registered node", entry)
            }
            DefinitionError::DuplicateNode { node } => {
                write!(f, "Duplicate node name: '{}'", node)
            }
            DefinitionError::UndeclaredNode { from, missing } => {
                write!(
                    f,
                    "Node '{}' routes to '{}' which does not exist",
                    from, missing
                )
            }
            DefinitionError::UnreachableNode { node } => {
                write!(f, "Node '{}' is unreachable from the entry node", node)
            }
            DefinitionError::FanOut { node, targets } => {
                write!(
                    f,
                    "Node '{}' has more than one unconditional edge: [{}]",
                    node,
                    targets.join(", ")
                )
            }
            DefinitionError::ConflictingEdges { node } => {
                write!(
                    f,
                    "Node '{}' declares both an unconditional and a conditional edge",
                    node
                )
            }
            DefinitionError::EmptyLabelMap { node } => {
                write!(f, "Conditional edge on node '{}' has no labels", node)
            }
        }
    }
}

impl std::error::Error for DefinitionError {}
