// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tutoring workflows built on the engine.
//!
//! Each task is a factory function returning a [`WorkflowDefinition`] over [`TutorState`];
//! the registry compiles them once at startup.
//!
//! | Task         | Path                                                          |
//! |--------------|---------------------------------------------------------------|
//! | `chat`       | classify -> generate -> finalize                              |
//! | `flashcards` | generate -> parse -> (ok: finalize, retry: generate, give_up) |
//! | `quiz`       | generate -> parse -> (ok: finalize, retry: generate, give_up) |
//!
//! [`WorkflowDefinition`]: crate::engine::WorkflowDefinition

pub mod chat;
pub mod flashcards;
pub mod nodes;
pub mod quiz;
pub mod state;

pub use state::{Role, TutorState, Turn, MAX_HISTORY_TURNS};

pub const CHAT: &str = "chat";
pub const FLASHCARDS: &str = "flashcards";
pub const QUIZ: &str = "quiz";

/// Router labels used by the retrying workflows
pub const LABEL_OK: &str = "ok";
pub const LABEL_RETRY: &str = "retry";
pub const LABEL_GIVE_UP: &str = "give_up";

/// Route on whether the last attempt produced items.
pub fn retry_router(max_attempts: u32) -> impl Fn(&TutorState) -> String + Send + Sync + 'static {
    move |state: &TutorState| {
        let label = match &state.items {
            Some(items) if !items.is_empty() => LABEL_OK,
            _ if state.attempts < max_attempts => LABEL_RETRY,
            _ => LABEL_GIVE_UP,
        };
        label.to_string()
    }
}
