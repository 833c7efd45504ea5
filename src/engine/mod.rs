// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow definition, compilation and execution.
//!
//! A [`WorkflowDefinition`] declares named nodes, unconditional edges, conditional edges
//! and one entry node. [`WorkflowDefinition::compile`] validates it and produces a
//! [`CompiledWorkflow`]: an immutable plan bound to a checkpoint store that any number of
//! concurrent invocations can share.
//!
//! Execution walks one path at a time. After a node runs, its conditional edge (if any)
//! asks the router for a label, otherwise its unconditional edge is followed; a node with
//! neither is terminal. A step budget bounds cyclic graphs, and running out of it is a
//! normal [`TerminalReason`], not an error.

pub mod compiled;
pub mod definition;
pub mod state;

pub use compiled::{CompiledWorkflow, Invocation, TerminalReason};
pub use definition::WorkflowDefinition;
pub use state::WorkflowState;

/// Reserved edge target that ends the invocation after the current node.
pub const END: &str = "__end__";
