// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Checkpoint store implementations.

pub mod memory;

pub use memory::{Checkpoint, InMemoryCheckpointStore};
