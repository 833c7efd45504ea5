// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::parser::ExpectedShape;

/// The recovery parser ran out of strategies.
///
/// This is an ordinary value: callers branch on it, nothing panics. The raw text is kept
/// for diagnostics.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("could not recover a JSON {shape} from generated text: {reason}")]
pub struct ParseFailure {
    pub raw: String,
    pub shape: ExpectedShape,
    pub reason: String,
}

impl ParseFailure {
    pub fn new(raw: impl Into<String>, shape: ExpectedShape, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            shape,
            reason: reason.into(),
        }
    }

    /// A short prefix of the raw text, safe to put in a log line.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut excerpt: String = self.raw.chars().take(max_chars).collect();
        if self.raw.chars().count() > max_chars {
            excerpt.push_str("...");
        }
        excerpt
    }
}
