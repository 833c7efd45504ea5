// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::{ParserOptions, TaskOptions};
use crate::engine::WorkflowDefinition;
use crate::parser::StructuredOutputParser;
use crate::tasks::nodes::{GenerateDraft, GiveUp, OnGenerationFailure, PublishItems, RecoverItems};
use crate::tasks::{retry_router, TutorState, LABEL_GIVE_UP, LABEL_OK, LABEL_RETRY, QUIZ};
use crate::traits::TextGenerator;

const QUESTION_FIELDS: [&str; 3] = ["question", "options", "answer"];

/// Multiple-choice quiz generation.
///
/// The generator is asked for `{"questions": [...]}`. The wrapper object is unwrapped by
/// the parser, so a bare list or a truncated reply recovered fragment by fragment work too.
pub fn workflow(
    generator: Arc<dyn TextGenerator>,
    options: TaskOptions,
    parser_options: &ParserOptions,
) -> WorkflowDefinition<TutorState> {
    let parser =
        StructuredOutputParser::from_options(parser_options).require_fields(QUESTION_FIELDS);
    let limit = options.item_count() as usize;
    let max_attempts = options.max_attempts();

    let mut definition = WorkflowDefinition::new(QUIZ);
    definition
        .register_node(
            "generate",
            GenerateDraft::new(generator, options, prompt, OnGenerationFailure::Record),
        )
        .register_node("parse", RecoverItems::new(parser, keep_questions, limit))
        .register_node("finalize", PublishItems::new("question_count"))
        .register_node("handle_error", GiveUp::new("quiz questions"))
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
        "Write {} multiple-choice questions about the text below. Reply with only JSON of the \
         form {{\"questions\": [{{\"question\": \"...\", \"options\": [\"...\"], \"answer\": \"...\"}}]}}.\n\n{}",
        options.item_count(),
        state.input_text
    )
}

/// Keep questions with at least two options and an answer that names one of them.
///
/// An answer given as an option index is rewritten to the option text.
fn keep_questions(value: Value) -> (Vec<Value>, Vec<String>) {
    let Value::Array(candidates) = value else {
        return (Vec::new(), vec!["expected a list of questions".to_string()]);
    };

    let mut questions = Vec::with_capacity(candidates.len());
    let mut dropped = Vec::new();
    for (i, candidate) in candidates.into_iter().enumerate() {
        match normalize_question(&candidate) {
            Ok(question) => questions.push(question),
            Err(reason) => dropped.push(format!("dropped question {}: {}", i + 1, reason)),
        }
    }
    (questions, dropped)
}

fn normalize_question(candidate: &Value) -> Result<Value, &'static str> {
    let question = candidate
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or("missing question text")?;

    let options: Vec<&str> = candidate
        .get("options")
        .and_then(Value::as_array)
        .ok_or("options is not a list")?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    if options.len() < 2 {
        return Err("fewer than two text options");
    }

    let answer = match candidate.get("answer") {
        Some(Value::String(text)) => options
            .iter()
            .find(|option| option.trim().eq_ignore_ascii_case(text.trim()))
            .copied(),
        Some(Value::Number(index)) => index
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| options.get(i).copied()),
        _ => None,
    }
    .ok_or("answer does not match an option")?;

    Ok(json!({
        "question": question,
        "options": options,
        "answer": answer,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ScriptedGenerator;

    #[test]
    fn test_normalize_question_table() {
        let cases = vec![
            (
                json!({"question": "2+2?", "options": ["3", "4"], "answer": "4"}),
                Ok("4"),
            ),
            (
                json!({"question": "2+2?", "options": ["3", "4"], "answer": 1}),
                Ok("4"),
            ),
            (
                json!({"question": "Capital?", "options": ["Paris", "Rome"], "answer": "paris "}),
                Ok("Paris"),
            ),
            (
                json!({"question": "", "options": ["a", "b"], "answer": "a"}),
                Err("missing question text"),
            ),
            (
                json!({"question": "Q", "options": ["only"], "answer": "only"}),
                Err("fewer than two text options"),
            ),
            (
                json!({"question": "Q", "options": ["a", "b"], "answer": 5}),
                Err("answer does not match an option"),
            ),
        ];

        for (input, expected) in cases {
            let result = normalize_question(&input);
            match expected {
                Ok(answer) => {
                    let question = result.unwrap();
                    assert_eq!(question["answer"], json!(answer), "input: {input}");
                }
                Err(reason) => assert_eq!(result.unwrap_err(), reason, "input: {input}"),
            }
        }
    }

    #[tokio::test]
    async fn test_wrapped_questions_are_unwrapped() {
        let reply = r#"Here is your quiz:
{"questions": [
  {"question": "Largest planet?", "options": ["Mars", "Jupiter"], "answer": "Jupiter"},
  {"question": "Closest star?", "options": ["Sun", "Sirius"], "answer": 0}
]}"#;
        let generator = Arc::new(ScriptedGenerator::new(vec![reply]));
        let workflow = workflow(generator, TaskOptions::default(), &ParserOptions::default())
            .compile()
            .unwrap();

        let result = workflow
            .invoke(TutorState::new("u", "s", "astronomy"), "s", 10)
            .await
            .unwrap();

        let items = result.state.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["answer"], json!("Sun"));
        assert_eq!(result.state.metadata.get("question_count"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_invalid_questions_trigger_retry() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            r#"{"questions": [{"question": "Q", "options": ["a"], "answer": "a"}]}"#,
            r#"[{"question": "Q", "options": ["a", "b"], "answer": "b"}]"#,
        ]));
        let workflow = workflow(generator, TaskOptions::default(), &ParserOptions::default())
            .compile()
            .unwrap();

        let result = workflow
            .invoke(TutorState::new("u", "s", "letters"), "s", 10)
            .await
            .unwrap();

        assert_eq!(result.state.attempts, 2);
        assert_eq!(result.state.warnings.len(), 2);
        assert!(result.state.output.is_some());
    }
}
