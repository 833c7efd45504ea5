// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collaborator implementations that run in-process.
//!
//! # Available Backends
//!
//! ## Scripted Generator
//! A [`TextGenerator`](crate::traits::TextGenerator) that replays canned replies in
//! order. The demo binary runs on it and the task tests use it to stage malformed,
//! truncated or failing generator output.
//!
//! ## Stub Backend (Test-Only)
//! Nodes and stores for engine tests (only available in test builds):
//! - **StubNode**: Passes state through unchanged
//! - **FailingNode**: Always returns a node error
//! - **SlowNode**: Sleeps before passing state through
//! - **FailingCheckpointStore**: Every read or write fails
//!
//! # Examples
//!
//! ```rust
//! use lessonflow::backends::ScriptedGenerator;
//! use lessonflow::traits::TextGenerator;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let generator = ScriptedGenerator::new(vec!["first", "second"]);
//! assert_eq!(generator.generate("prompt", 64, 0.0).await.unwrap(), "first");
//! assert_eq!(generator.remaining(), 1);
//! # });
//! ```

pub mod scripted;
#[cfg(test)]
pub mod stub;

pub use scripted::ScriptedGenerator;
