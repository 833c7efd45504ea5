// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::TaskOptions;
use crate::engine::WorkflowDefinition;
use crate::errors::NodeError;
use crate::tasks::nodes::{GenerateDraft, OnGenerationFailure};
use crate::tasks::{Role, TutorState, CHAT};
use crate::traits::{node_fn, TextGenerator};

const QUESTION_WORDS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", "which", "can", "could", "is", "are", "does",
    "do", "explain",
];
const GREETINGS: &[&str] = &["hi", "hello", "hey", "greetings", "howdy"];

/// Conversational tutor: classify the input, generate a reply, record the exchange.
pub fn workflow(generator: Arc<dyn TextGenerator>, options: TaskOptions) -> WorkflowDefinition<TutorState> {
    let mut definition = WorkflowDefinition::new(CHAT);
    definition
        .register_node(
            "classify",
            node_fn(|mut state: TutorState| async move {
                state.intent = Some(classify(&state.input_text).to_string());
                Ok(state)
            }),
        )
        .register_node(
            "generate",
            GenerateDraft::new(generator, options, prompt, OnGenerationFailure::Abort),
        )
        .register_node("finalize", node_fn(finalize))
        .add_edge("classify", "generate")
        .add_edge("generate", "finalize")
        .set_entry("classify");
    definition
}

/// Coarse intent of a learner message.
pub fn classify(input: &str) -> &'static str {
    let normalized = input.trim().to_lowercase();
    let first_word = normalized
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("");

    if normalized.is_empty() {
        "empty"
    } else if GREETINGS.contains(&first_word) && normalized.len() < 24 {
        "greeting"
    } else if normalized.ends_with('?') || QUESTION_WORDS.contains(&first_word) {
        "question"
    } else {
        "statement"
    }
}

fn prompt(state: &TutorState, _: &TaskOptions) -> String {
    let mut prompt = String::from("You are a patient tutor. Continue the conversation.\n");
    for turn in &state.history {
        let speaker = match turn.role {
            Role::Learner => "Learner",
            Role::Tutor => "Tutor",
        };
        prompt.push_str(&format!("{}: {}\n", speaker, turn.content));
    }
    if let Some(intent) = &state.intent {
        prompt.push_str(&format!("(The learner's message is a {}.)\n", intent));
    }
    prompt.push_str(&format!("Learner: {}\nTutor:", state.input_text));
    prompt
}

async fn finalize(mut state: TutorState) -> Result<TutorState, NodeError> {
    let reply = state
        .draft
        .as_deref()
        .map(str::trim)
        .filter(|reply| !reply.is_empty())
        .ok_or(NodeError::MissingField { field: "draft" })?
        .to_string();

    let input = state.input_text.clone();
    state.push_turn(Role::Learner, input);
    state.push_turn(Role::Tutor, reply.clone());

    if let Some(intent) = state.intent.clone() {
        state.note("intent", intent);
    }
    state.note("history_turns", state.history.len());
    state.confidence = Some(if state.warnings.is_empty() { 0.9 } else { 0.6 });
    state.output = Some(reply);
    Ok(state)
}
