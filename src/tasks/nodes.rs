// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node bodies shared by several tutoring workflows.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::TaskOptions;
use crate::errors::{GenerationError, NodeError};
use crate::observability::messages::generation::GenerationFailed;
use crate::observability::messages::StructuredLog;
use crate::parser::{ExpectedShape, StructuredOutputParser};
use crate::tasks::TutorState;
use crate::traits::{Node, TextGenerator};

/// Builds the prompt for one generation attempt.
pub type PromptFn = fn(&TutorState, &TaskOptions) -> String;

/// Turns a recovered value into usable items, reporting what it dropped.
pub type ItemFilter = fn(Value) -> (Vec<Value>, Vec<String>);

/// What a generation failure does to the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnGenerationFailure {
    /// Return the error and abort
    Abort,
    /// Record it in `errors`, clear the draft and let routing decide
    Record,
}

/// Calls the generator and stores its reply in `draft`.
pub struct GenerateDraft {
    generator: Arc<dyn TextGenerator>,
    options: TaskOptions,
    prompt: PromptFn,
    on_failure: OnGenerationFailure,
}

impl GenerateDraft {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        options: TaskOptions,
        prompt: PromptFn,
        on_failure: OnGenerationFailure,
    ) -> Self {
        Self {
            generator,
            options,
            prompt,
            on_failure,
        }
    }
}

#[async_trait]
impl Node<TutorState> for GenerateDraft {
    async fn run(&self, mut state: TutorState) -> Result<TutorState, NodeError> {
        state.attempts += 1;
        let prompt = (self.prompt)(&state, &self.options);

        let reply = self
            .generator
            .generate(&prompt, self.options.max_tokens(), self.options.temperature())
            .await
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(GenerationError::Empty)
                } else {
                    Ok(text)
                }
            });

        if let Err(error) = &reply {
            GenerationFailed {
                generator: self.generator.name(),
                attempt: state.attempts,
                error,
            }
            .log();
        }

        match (reply, self.on_failure) {
            (Ok(text), _) => state.draft = Some(text),
            (Err(error), OnGenerationFailure::Abort) => return Err(error.into()),
            (Err(error), OnGenerationFailure::Record) => {
                state
                    .errors
                    .push(format!("attempt {}: {}", state.attempts, error));
                state.draft = None;
            }
        }

        Ok(state)
    }
}

/// Recovers a list of records from `draft` into `items`.
///
/// Parsing runs on the blocking pool. A parse failure never aborts: it becomes a warning
/// and `items` is cleared so the router can retry.
pub struct RecoverItems {
    parser: StructuredOutputParser,
    filter: ItemFilter,
    limit: usize,
}

impl RecoverItems {
    pub fn new(parser: StructuredOutputParser, filter: ItemFilter, limit: usize) -> Self {
        Self {
            parser,
            filter,
            limit,
        }
    }
}

#[async_trait]
impl Node<TutorState> for RecoverItems {
    async fn run(&self, mut state: TutorState) -> Result<TutorState, NodeError> {
        state.items = None;
        let Some(draft) = state.draft.clone() else {
            return Ok(state);
        };

        let parser = self.parser.clone();
        let outcome =
            tokio::task::spawn_blocking(move || parser.recover(&draft, ExpectedShape::Array))
                .await
                .map_err(|e| NodeError::Failed(format!("output recovery did not finish: {}", e)))?;

        match outcome {
            Ok(recovered) => {
                let (mut items, dropped) = (self.filter)(recovered.value);
                state.warnings.extend(
                    dropped
                        .into_iter()
                        .map(|reason| format!("attempt {}: {}", state.attempts, reason)),
                );
                items.truncate(self.limit);

                if items.is_empty() {
                    state
                        .warnings
                        .push(format!("attempt {}: no usable items", state.attempts));
                } else {
                    state.note("recovery_strategy", recovered.strategy.as_str());
                    state.items = Some(items);
                }
            }
            Err(failure) => {
                state.warnings.push(format!(
                    "attempt {}: {} (output began '{}')",
                    state.attempts,
                    failure.reason,
                    failure.excerpt(40)
                ));
            }
        }

        Ok(state)
    }
}

/// Publishes the recovered items as the response.
pub struct PublishItems {
    /// Metadata key for the item count, e.g. `card_count`
    count_key: &'static str,
}

impl PublishItems {
    pub fn new(count_key: &'static str) -> Self {
        Self { count_key }
    }
}

#[async_trait]
impl Node<TutorState> for PublishItems {
    async fn run(&self, mut state: TutorState) -> Result<TutorState, NodeError> {
        let items = state
            .items
            .take()
            .ok_or(NodeError::MissingField { field: "items" })?;

        let output = serde_json::to_string(&items).map_err(|e| NodeError::Failed(e.to_string()))?;
        state.note(self.count_key, items.len());
        state.note("attempts", state.attempts);
        state.confidence = Some(items_confidence(state.attempts, state.warnings.len()));
        state.output = Some(output);
        state.items = Some(items);

        Ok(state)
    }
}

/// Records that no attempt produced usable items.
pub struct GiveUp {
    what: &'static str,
}

impl GiveUp {
    pub fn new(what: &'static str) -> Self {
        Self { what }
    }
}

#[async_trait]
impl Node<TutorState> for GiveUp {
    async fn run(&self, mut state: TutorState) -> Result<TutorState, NodeError> {
        state.errors.push(format!(
            "no {} could be recovered after {} attempt(s)",
            self.what, state.attempts
        ));
        state.output = None;
        state.confidence = Some(0.0);
        state.note("attempts", state.attempts);
        Ok(state)
    }
}

/// Confidence drops with every extra attempt and every warning, never below 0.1.
pub fn items_confidence(attempts: u32, warnings: usize) -> f64 {
    let retries = attempts.saturating_sub(1) as f64;
    (1.0 - 0.2 * retries - 0.05 * warnings as f64).clamp(0.1, 1.0)
}
