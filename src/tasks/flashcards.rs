// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::sync::Arc;

use crate::config::{ParserOptions, TaskOptions};
use crate::engine::WorkflowDefinition;
use crate::parser::StructuredOutputParser;
use crate::tasks::nodes::{GenerateDraft, GiveUp, OnGenerationFailure, PublishItems, RecoverItems};
use crate::tasks::{retry_router, TutorState, FLASHCARDS, LABEL_GIVE_UP, LABEL_OK, LABEL_RETRY};
use crate::traits::TextGenerator;

const CARD_FIELDS: [&str; 2] = ["front", "back"];

/// Flashcard generation with bounded retries on unparseable output.
///
/// Recovered fragments must carry a front, a back and any configured required fields.
pub fn workflow(
    generator: Arc<dyn TextGenerator>,
    options: TaskOptions,
    parser_options: &ParserOptions,
) -> WorkflowDefinition<TutorState> {
    let parser = StructuredOutputParser::from_options(parser_options).require_fields(CARD_FIELDS);
    let limit = options.item_count() as usize;
    let max_attempts = options.max_attempts();

    let mut definition = WorkflowDefinition::new(FLASHCARDS);
    definition
        .register_node(
            "generate",
            GenerateDraft::new(generator, options, prompt, OnGenerationFailure::Record),
        )
        .register_node("parse", RecoverItems::new(parser, keep_cards, limit))
        .register_node("finalize", PublishItems::new("card_count"))
        .register_node("handle_error", GiveUp::new("flashcards"))
        .add_edge("generate", "parse")
        .add_conditional_edge(
            "parse",
            retry_router(max_attempts),
            [
                (LABEL_OK, "finalize"),
                (LABEL_RETRY, "generate"),
                (LABEL_GIVE_UP, "handle_error"),
            ],
        )
        .set_entry("generate");
    definition
}

fn prompt(state: &TutorState, options: &TaskOptions) -> String {
    format!(
        "Write {} flashcards about the text below. Reply with only a JSON array of objects \
         with string fields \"front\" and \"back\".\n\n{}",
        options.item_count(),
        state.input_text
    )
}

/// Keep cards whose front and back are non-empty strings.
fn keep_cards(value: Value) -> (Vec<Value>, Vec<String>) {
    let Value::Array(candidates) = value else {
        return (Vec::new(), vec!["expected a list of cards".to_string()]);
    };

    let mut cards = Vec::with_capacity(candidates.len());
    let mut dropped = Vec::new();
    for (i, card) in candidates.into_iter().enumerate() {
        let usable = CARD_FIELDS.iter().all(|field| {
            card.get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| !text.trim().is_empty())
        });
        if usable {
            cards.push(card);
        } else {
            dropped.push(format!("dropped card {} without a front and back", i + 1));
        }
    }
    (cards, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ScriptedGenerator;
    use crate::engine::TerminalReason;
    use serde_json::json;

    fn options(max_attempts: u32, item_count: u32) -> TaskOptions {
        TaskOptions {
            max_attempts: Some(max_attempts),
            item_count: Some(item_count),
            ..Default::default()
        }
    }

    #[test]
    fn test_keep_cards_drops_incomplete() {
        let (cards, dropped) = keep_cards(json!([
            {"front": "H2O", "back": "water"},
            {"front": "NaCl"},
            {"front": "", "back": "nothing"},
        ]));
        assert_eq!(cards, vec![json!({"front": "H2O", "back": "water"})]);
        assert_eq!(dropped.len(), 2);
    }

    #[tokio::test]
    async fn test_fenced_reply_succeeds_first_try() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            "Sure!\n```json\n[{\"front\": \"H2O\", \"back\": \"water\"}, {\"front\": \"CO2\", \"back\": \"carbon dioxide\"},]\n```",
        ]));
        let workflow = workflow(generator, options(3, 5), &ParserOptions::default())
            .compile()
            .unwrap();

        let result = workflow
            .invoke(TutorState::new("u", "s", "chemistry"), "s", 10)
            .await
            .unwrap();

        assert_eq!(result.state.trace, vec!["generate", "parse", "finalize"]);
        assert_eq!(result.state.items.as_ref().map(Vec::len), Some(2));
        assert_eq!(result.state.metadata.get("card_count"), Some(&json!(2)));
        assert_eq!(result.state.confidence, Some(1.0));
    }

    #[tokio::test]
    async fn test_retry_after_unparseable_reply() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            "I cannot format that as JSON, sorry.",
            r#"[{"front": "mitosis", "back": "cell division"}]"#,
        ]));
        let workflow = workflow(generator, options(3, 5), &ParserOptions::default())
            .compile()
            .unwrap();

        let result = workflow
            .invoke(TutorState::new("u", "s", "biology"), "s", 10)
            .await
            .unwrap();

        assert_eq!(
            result.state.trace,
            vec!["generate", "parse", "generate", "parse", "finalize"]
        );
        assert_eq!(result.state.attempts, 2);
        assert_eq!(result.state.warnings.len(), 1);
        assert!(result.state.output.is_some());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let generator = Arc::new(ScriptedGenerator::new(vec!["nope", "still nope"]));
        let workflow = workflow(generator, options(2, 5), &ParserOptions::default())
            .compile()
            .unwrap();

        let result = workflow
            .invoke(TutorState::new("u", "s", "history"), "s", 20)
            .await
            .unwrap();

        assert_eq!(
            result.terminal_reason,
            TerminalReason::Completed {
                node: "handle_error".to_string()
            }
        );
        assert!(result.state.output.is_none());
        assert_eq!(result.state.errors.len(), 1);
        assert!(result.state.errors[0].contains("after 2 attempt(s)"));
    }

    #[tokio::test]
    async fn test_truncated_reply_recovers_complete_cards() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            r#"[{"front": "a", "back": "1"}, {"front": "b", "back": "2"}, {"front": "c", "ba"#,
        ]));
        let workflow = workflow(generator, options(1, 5), &ParserOptions::default())
            .compile()
            .unwrap();

        let result = workflow
            .invoke(TutorState::new("u", "s", "letters"), "s", 10)
            .await
            .unwrap();

        assert_eq!(result.state.items.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            result.state.metadata.get_str("recovery_strategy"),
            Some("fragments")
        );
    }

    #[tokio::test]
    async fn test_configured_required_fields_filter_fragments() {
        let reply = r#"[{"front": "a", "back": "1", "hint": "vowel"}, {"front": "b", "back": "2"}, {"front": "c"#;
        let parser_options = ParserOptions {
            required_fields: vec!["hint".to_string()],
            ..Default::default()
        };
        let generator = Arc::new(ScriptedGenerator::new(vec![reply]));
        let workflow = workflow(generator, options(1, 5), &parser_options)
            .compile()
            .unwrap();

        let result = workflow
            .invoke(TutorState::new("u", "s", "letters"), "s", 10)
            .await
            .unwrap();

        assert_eq!(
            result.state.items,
            Some(vec![json!({"front": "a", "back": "1", "hint": "vowel"})])
        );
    }
}
