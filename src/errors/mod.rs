// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod checkpoint;
mod config;
mod definition;
mod execution;
mod node;
mod parse;
mod registry;

pub use checkpoint::CheckpointError;
pub use config::ConfigError;
pub use definition::DefinitionError;
pub use execution::{ExecutionError, InvocationError};
pub use node::{GenerationError, NodeError};
pub use parse::ParseFailure;
pub use registry::RegistryError;
