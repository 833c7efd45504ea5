// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // generator backends
pub mod boundary;      // seed in, envelope out
pub mod checkpoint;    // checkpoint stores
pub mod config;        // config + registry
pub mod engine;        // workflow definition and execution
pub mod errors;        // error handling
pub mod observability;
pub mod parser;        // structured output recovery
pub mod tasks;         // tutoring workflows
pub mod traits;        // unified abstractions
pub mod utils;
