// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log events are struct-based message types with a `Display` implementation, so log text
//! lives in one place instead of being scattered through the engine as string literals.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - invocation lifecycle and per-node events
//! * `messages::boundary` - task dispatch and failure envelopes
//! * `messages::checkpoint` - checkpoint reads and writes
//! * `messages::parser` - structured output recovery outcomes
//! * `messages::validation` - workflow compilation results
//!
//! # Usage
//!
//! ```rust
//! use lessonflow::observability::messages::{engine::BudgetExhausted, StructuredLog};
//!
//! BudgetExhausted {
//!     workflow: "flashcards",
//!     thread_id: "u1:s1",
//!     steps: 12,
//! }
//! .log();
//! ```

pub mod messages;
