// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::WorkflowState;
use crate::utils::Metadata;

/// Conversation turns kept across invocations of one session
pub const MAX_HISTORY_TURNS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Learner,
    Tutor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Execution state shared by the tutoring workflows.
///
/// Identity and input fields are set by the caller. Working fields start empty and are
/// filled by the node that owns them; a node that reads one must tolerate `None` unless
/// every path to it sets the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorState {
    pub actor_id: String,
    pub session_id: String,
    pub input_text: String,

    /// Coarse classification of the learner's input
    pub intent: Option<String>,
    /// Latest raw text from the generator
    pub draft: Option<String>,
    /// Records recovered from the latest draft
    pub items: Option<Vec<Value>>,
    /// Generation attempts made in this invocation
    pub attempts: u32,
    pub history: Vec<Turn>,

    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub trace: Vec<String>,

    pub output: Option<String>,
    pub confidence: Option<f64>,
    pub metadata: Metadata,
}

impl TutorState {
    pub fn new(
        actor_id: impl Into<String>,
        session_id: impl Into<String>,
        input_text: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            session_id: session_id.into(),
            input_text: input_text.into(),
            ..Default::default()
        }
    }

    /// Record a metadata entry, turning an overflow into a warning.
    pub fn note(&mut self, key: &str, value: impl Into<Value>) {
        if !self.metadata.insert(key, value) {
            self.warnings
                .push(format!("metadata full, dropped '{}'", key));
        }
    }

    pub fn push_turn(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(Turn {
            role,
            content: content.into(),
        });
        if self.history.len() > MAX_HISTORY_TURNS {
            let excess = self.history.len() - MAX_HISTORY_TURNS;
            self.history.drain(..excess);
        }
    }
}

impl WorkflowState for TutorState {
    fn record_visit(&mut self, node: &str) {
        self.trace.push(node.to_string());
    }

    fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Only the conversation history survives between invocations of a session.
    fn carry_over(&mut self, previous: &Self) {
        let mut history = previous.history.clone();
        history.append(&mut self.history);
        self.history = history;
        if self.history.len() > MAX_HISTORY_TURNS {
            let excess = self.history.len() - MAX_HISTORY_TURNS;
            self.history.drain(..excess);
        }
    }
}
