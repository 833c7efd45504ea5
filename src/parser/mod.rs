// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured output recovery for generated text.
//!
//! Generative models are asked for JSON but routinely wrap it in prose, fence it in
//! markdown, leave trailing commas or stop mid-list. [`StructuredOutputParser`] runs an
//! ordered cascade of increasingly forgiving strategies and stops at the first success:
//!
//! 1. **Direct** - parse the trimmed text as-is
//! 2. **Unfenced** - strip a fenced code block (with or without a language tag) and parse
//! 3. **Extracted** - parse the first balanced `{...}` or `[...]` for the expected shape
//! 4. **Repaired** - drop surrounding prose, control characters and trailing commas, then
//!    retry 1-3
//! 5. **Fragments** - collect every parseable `{...}` chunk carrying the required fields
//!
//! When every strategy fails the caller gets a [`ParseFailure`] holding the raw text. The
//! parser never panics and never substitutes an empty value for a failed parse.
//!
//! # Examples
//!
//! ```rust
//! use lessonflow::parser::{parse, ExpectedShape};
//! use serde_json::json;
//!
//! let value = parse("Here:\n```json\n{\"a\":1}\n```", ExpectedShape::Object).unwrap();
//! assert_eq!(value, json!({"a": 1}));
//!
//! let cards = parse(r#"[{"q":"x"},{"q":"y"},]"#, ExpectedShape::Array).unwrap();
//! assert_eq!(cards.as_array().map(Vec::len), Some(2));
//!
//! assert!(parse("no brackets here", ExpectedShape::Object).is_err());
//! ```

mod fragments;
mod repair;
mod scan;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use crate::config::consts::DEFAULT_MAX_PARSE_INPUT_BYTES;
use crate::config::ParserOptions;
use crate::observability::messages::parser::{OutputRecovered, OutputUnrecoverable};
use crate::observability::messages::StructuredLog;

pub use crate::errors::ParseFailure;

/// The top-level JSON shape a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    Object,
    Array,
}

impl ExpectedShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedShape::Object => "object",
            ExpectedShape::Array => "array",
        }
    }

    pub(crate) fn delimiters(&self) -> (u8, u8) {
        match self {
            ExpectedShape::Object => (b'{', b'}'),
            ExpectedShape::Array => (b'[', b']'),
        }
    }

    /// Accept `value` if it has this shape.
    ///
    /// An array is also accepted when wrapped in an object whose only field holds it,
    /// e.g. `{"cards": [...]}`.
    fn accept(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (ExpectedShape::Object, value @ Value::Object(_)) => Some(value),
            (ExpectedShape::Array, value @ Value::Array(_)) => Some(value),
            (ExpectedShape::Array, Value::Object(mut object)) if object.len() == 1 => {
                let key = object.keys().next().cloned()?;
                match object.remove(&key)? {
                    inner @ Value::Array(_) => Some(inner),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for ExpectedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cascade step produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    Direct,
    Unfenced,
    Extracted,
    Repaired,
    Fragments,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStrategy::Direct => "direct",
            RecoveryStrategy::Unfenced => "unfenced",
            RecoveryStrategy::Extracted => "extracted",
            RecoveryStrategy::Repaired => "repaired",
            RecoveryStrategy::Fragments => "fragments",
        }
    }
}

/// A recovered value and the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub value: Value,
    pub strategy: RecoveryStrategy,
}

/// Recovery parser configured with the fields a fragment must carry.
#[derive(Debug, Clone)]
pub struct StructuredOutputParser {
    required_fields: Vec<String>,
    max_input_bytes: usize,
}

impl Default for StructuredOutputParser {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            max_input_bytes: DEFAULT_MAX_PARSE_INPUT_BYTES,
        }
    }
}

impl StructuredOutputParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: &ParserOptions) -> Self {
        Self {
            required_fields: options.required_fields.clone(),
            max_input_bytes: options.max_input_bytes(),
        }
    }

    /// Add `fields` to the ones every recovered fragment must contain, skipping duplicates.
    pub fn require_fields<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for field in fields.into_iter().map(Into::into) {
            if !self.required_fields.contains(&field) {
                self.required_fields.push(field);
            }
        }
        self
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn with_max_input_bytes(mut self, max_input_bytes: usize) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    /// Recover a value of `shape` from `raw`.
    pub fn parse(&self, raw: &str, shape: ExpectedShape) -> Result<Value, ParseFailure> {
        self.recover(raw, shape).map(|recovered| recovered.value)
    }

    /// Recover a value of `shape` and deserialize it into `T`.
    pub fn parse_as<T: DeserializeOwned>(
        &self,
        raw: &str,
        shape: ExpectedShape,
    ) -> Result<T, ParseFailure> {
        let value = self.parse(raw, shape)?;
        serde_json::from_value(value).map_err(|e| {
            ParseFailure::new(raw, shape, format!("recovered JSON has the wrong fields: {}", e))
        })
    }

    /// Run the cascade, reporting which strategy succeeded.
    pub fn recover(&self, raw: &str, shape: ExpectedShape) -> Result<Recovered, ParseFailure> {
        match self.run_cascade(raw, shape) {
            Ok(recovered) => {
                OutputRecovered {
                    strategy: recovered.strategy.as_str(),
                    shape: shape.as_str(),
                    input_size: raw.len(),
                }
                .log();
                Ok(recovered)
            }
            Err(failure) => {
                OutputUnrecoverable {
                    shape: shape.as_str(),
                    input_size: raw.len(),
                    reason: &failure.reason,
                }
                .log();
                Err(failure)
            }
        }
    }

    fn run_cascade(&self, raw: &str, shape: ExpectedShape) -> Result<Recovered, ParseFailure> {
        if raw.len() > self.max_input_bytes {
            return Err(ParseFailure::new(
                raw,
                shape,
                format!(
                    "input of {} bytes exceeds the {} byte limit",
                    raw.len(),
                    self.max_input_bytes
                ),
            ));
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseFailure::new(raw, shape, "input is empty"));
        }

        if let Some(recovered) = basic_strategies(trimmed, shape) {
            return Ok(recovered);
        }

        let repaired = repair::repair(trimmed, shape);
        if let Some(recovered) = basic_strategies(&repaired, shape) {
            return Ok(Recovered {
                value: recovered.value,
                strategy: RecoveryStrategy::Repaired,
            });
        }

        if let Some(value) = self.recover_fragments(trimmed, shape) {
            return Ok(Recovered {
                value,
                strategy: RecoveryStrategy::Fragments,
            });
        }

        Err(ParseFailure::new(raw, shape, "no recovery strategy succeeded"))
    }

    fn recover_fragments(&self, text: &str, shape: ExpectedShape) -> Option<Value> {
        let cleaned = repair::strip_control_chars(text);
        let mut found = fragments::collect(&cleaned, &self.required_fields);

        match shape {
            ExpectedShape::Array if !found.is_empty() => Some(Value::Array(found)),
            ExpectedShape::Object if !found.is_empty() => Some(found.swap_remove(0)),
            _ => None,
        }
    }
}

/// Steps 1-3 of the cascade against one candidate text.
fn basic_strategies(text: &str, shape: ExpectedShape) -> Option<Recovered> {
    if let Some(value) = parse_direct(text, shape) {
        return Some(Recovered {
            value,
            strategy: RecoveryStrategy::Direct,
        });
    }

    let unfenced = scan::strip_code_fences(text);
    if let Some(inner) = unfenced {
        if let Some(value) = parse_direct(inner, shape) {
            return Some(Recovered {
                value,
                strategy: RecoveryStrategy::Unfenced,
            });
        }
    }

    let (open, _) = shape.delimiters();
    let mut candidates = vec![text];
    if let Some(inner) = unfenced {
        candidates.insert(0, inner);
    }

    candidates
        .into_iter()
        .filter_map(|candidate| scan::first_balanced(candidate, open))
        .find_map(|chunk| parse_direct(chunk, shape))
        .map(|value| Recovered {
            value,
            strategy: RecoveryStrategy::Extracted,
        })
}

fn parse_direct(text: &str, shape: ExpectedShape) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .and_then(|value| shape.accept(value))
}

/// Recover a value with a default parser.
pub fn parse(raw: &str, shape: ExpectedShape) -> Result<Value, ParseFailure> {
    StructuredOutputParser::default().parse(raw, shape)
}

/// Recover and deserialize a value with a default parser.
pub fn parse_as<T: DeserializeOwned>(raw: &str, shape: ExpectedShape) -> Result<T, ParseFailure> {
    StructuredOutputParser::default().parse_as(raw, shape)
}
