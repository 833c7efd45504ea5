// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The caller-facing edge of the engine.
//!
//! [`InvocationBoundary`] turns an [`InvocationSeed`] into a [`TutorState`], runs the
//! task's workflow under a wall-clock limit and a cancellation token, and always answers
//! with a [`ResponseEnvelope`]. Hard failures (node errors, routing errors, timeouts,
//! cancellation) become a uniform failure envelope and are logged with the thread id,
//! node name and step index; soft failures recorded in state come back as a degraded but
//! successful envelope.
//!
//! [`TutorState`]: crate::tasks::TutorState

pub mod envelope;
pub mod runner;

pub use envelope::{InvocationSeed, ResponseEnvelope};
pub use runner::InvocationBoundary;
