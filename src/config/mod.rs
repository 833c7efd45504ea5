// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod registry;
mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, EngineConfig, ExecutionOptions, ParserOptions,
    TaskOptions,
};
pub use registry::TaskRegistry;
pub use validation::{validate_workflow_graph, GraphOutline};
