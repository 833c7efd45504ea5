// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::engine::{Invocation, TerminalReason};
use crate::errors::InvocationError;
use crate::tasks::TutorState;
use crate::utils::{merge_metadata_with_prefix, Metadata};

const WARNINGS_KEY: &str = "warnings";

/// What a caller sends to start an invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationSeed {
    pub actor_id: String,
    pub session_id: String,
    pub input_text: String,
    /// Free-form request parameters, copied into metadata as `param_*`
    #[serde(default)]
    pub params: Metadata,
}

impl InvocationSeed {
    pub fn new(
        actor_id: impl Into<String>,
        session_id: impl Into<String>,
        input_text: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            session_id: session_id.into(),
            input_text: input_text.into(),
            params: Metadata::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Initial state for a fresh invocation.
    pub fn into_state(self) -> TutorState {
        let mut state = TutorState::new(self.actor_id, self.session_id, self.input_text);
        for key in merge_metadata_with_prefix(&mut state.metadata, "param", &self.params) {
            state.warnings.push(format!("metadata full, dropped '{}'", key));
        }
        state
    }
}

/// What every invocation returns, success or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub output_text: String,
    pub confidence: f64,
    pub metadata: Metadata,
    pub errors: Vec<String>,
    pub elapsed_ms: u64,
}

impl ResponseEnvelope {
    /// Envelope for a workflow that terminated normally.
    ///
    /// Success means the workflow produced output. Warnings from the state are reported
    /// under the `warnings` metadata key. The envelope's own keys take precedence over
    /// state metadata; state keys that no longer fit become warnings.
    pub fn from_invocation(task_type: &str, invocation: Invocation<TutorState>, elapsed: Duration) -> Self {
        let Invocation {
            state,
            terminal_reason,
            steps,
        } = invocation;

        let mut errors = state.errors;
        let mut warnings = state.warnings;

        // Envelope keys go in first, with `warnings` held open, so they always fit.
        let mut metadata = Metadata::new();
        metadata.insert("task_type", task_type);
        metadata.insert("terminal_reason", terminal_reason.as_str());
        metadata.insert("steps", steps);
        metadata.insert("trace", state.trace);
        metadata.insert(WARNINGS_KEY, Value::Null);

        for (key, value) in state.metadata.iter() {
            if metadata.contains_key(key) {
                continue;
            }
            if !metadata.insert(key.clone(), value.clone()) {
                warnings.push(format!("metadata full, dropped '{}'", key));
            }
        }

        if warnings.is_empty() {
            metadata.remove(WARNINGS_KEY);
        } else {
            metadata.insert(WARNINGS_KEY, warnings);
        }

        if let TerminalReason::BudgetExceeded { budget } = terminal_reason {
            errors.push(format!("step budget of {} exhausted", budget));
        }

        let success = state.output.is_some();
        Self {
            success,
            output_text: state.output.unwrap_or_default(),
            confidence: state.confidence.unwrap_or(0.0),
            metadata,
            errors,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Uniform envelope for a hard failure.
    pub fn failure(task_type: &str, error: &InvocationError, elapsed: Duration) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("task_type", task_type);
        if let InvocationError::Execution(execution) = error {
            if let Some((node, step)) = execution.location() {
                metadata.insert("failed_node", node);
                metadata.insert("failed_step", step);
            }
        }

        Self {
            success: false,
            output_text: String::new(),
            confidence: 0.0,
            metadata,
            errors: vec![error.to_string()],
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::MAX_METADATA_ENTRIES;
    use crate::errors::{ExecutionError, NodeError};
    use serde_json::json;

    fn finished(output: Option<&str>, terminal_reason: TerminalReason) -> Invocation<TutorState> {
        let mut state = TutorState::new("u", "s", "in");
        state.output = output.map(str::to_string);
        state.confidence = output.map(|_| 0.9);
        state.trace = vec!["a".to_string(), "b".to_string()];
        state.warnings.push("minor".to_string());
        Invocation {
            state,
            terminal_reason,
            steps: 2,
        }
    }

    #[test]
    fn test_seed_params_become_prefixed_metadata() {
        let state = InvocationSeed::new("u1", "s1", "teach me")
            .with_param("topic", "fractions")
            .into_state();

        assert_eq!(state.actor_id, "u1");
        assert_eq!(state.metadata.get_str("param_topic"), Some("fractions"));
        assert!(state.warnings.is_empty());
    }

    #[test]
    fn test_seed_deserializes_without_params() {
        let seed: InvocationSeed =
            serde_json::from_str(r#"{"actor_id":"a","session_id":"s","input_text":"hi"}"#).unwrap();
        assert!(seed.params.is_empty());
    }

    #[test]
    fn test_completed_envelope() {
        let envelope = ResponseEnvelope::from_invocation(
            "chat",
            finished(Some("answer"), TerminalReason::Completed { node: "b".to_string() }),
            Duration::from_millis(12),
        );

        assert!(envelope.success);
        assert_eq!(envelope.output_text, "answer");
        assert_eq!(envelope.confidence, 0.9);
        assert_eq!(envelope.elapsed_ms, 12);
        assert!(envelope.errors.is_empty());
        assert_eq!(envelope.metadata.get("trace"), Some(&json!(["a", "b"])));
        assert_eq!(envelope.metadata.get("warnings"), Some(&json!(["minor"])));
        assert_eq!(envelope.metadata.get_str("terminal_reason"), Some("completed"));
    }

    #[test]
    fn test_full_state_metadata_cannot_hide_envelope_keys() {
        let mut invocation =
            finished(Some("answer"), TerminalReason::Completed { node: "b".to_string() });
        for i in 0..MAX_METADATA_ENTRIES {
            invocation.state.metadata.insert(format!("param_{:02}", i), i);
        }

        let envelope = ResponseEnvelope::from_invocation("chat", invocation, Duration::ZERO);

        assert_eq!(envelope.metadata.len(), MAX_METADATA_ENTRIES);
        assert_eq!(envelope.metadata.get_str("task_type"), Some("chat"));
        assert_eq!(envelope.metadata.get_str("terminal_reason"), Some("completed"));
        assert_eq!(envelope.metadata.get("trace"), Some(&json!(["a", "b"])));

        let warnings = envelope.metadata.get("warnings").and_then(Value::as_array).unwrap();
        assert_eq!(warnings[0], json!("minor"));
        assert_eq!(warnings.len(), 1 + 5);
        assert!(warnings[1..]
            .iter()
            .all(|w| w.as_str().unwrap().starts_with("metadata full")));
    }

    #[test]
    fn test_seed_with_too_many_params_is_rejected() {
        let params: serde_json::Map<String, Value> = (0..200)
            .map(|i| (format!("p{}", i), Value::from(i)))
            .collect();
        let body = json!({
            "actor_id": "a",
            "session_id": "s",
            "input_text": "hi",
            "params": params,
        });

        assert!(serde_json::from_value::<InvocationSeed>(body).is_err());
    }

    #[test]
    fn test_budget_exceeded_envelope_reports_error() {
        let envelope = ResponseEnvelope::from_invocation(
            "chat",
            finished(None, TerminalReason::BudgetExceeded { budget: 2 }),
            Duration::ZERO,
        );

        assert!(!envelope.success);
        assert_eq!(envelope.output_text, "");
        assert_eq!(envelope.errors, vec!["step budget of 2 exhausted"]);
    }

    #[test]
    fn test_failure_envelope_carries_location() {
        let error = InvocationError::Execution(ExecutionError::Node {
            node: "generate".to_string(),
            step: 1,
            source: NodeError::Failed("boom".to_string()),
        });

        let envelope = ResponseEnvelope::failure("chat", &error, Duration::from_millis(3));

        assert!(!envelope.success);
        assert_eq!(envelope.metadata.get_str("failed_node"), Some("generate"));
        assert_eq!(envelope.metadata.get("failed_step"), Some(&json!(1)));
        assert_eq!(envelope.errors.len(), 1);
        assert!(envelope.errors[0].contains("boom"));
    }

    #[test]
    fn test_envelope_serializes_flat_metadata() {
        let envelope = ResponseEnvelope {
            success: true,
            output_text: "ok".to_string(),
            confidence: 1.0,
            metadata: Metadata::new(),
            errors: vec![],
            elapsed_ms: 5,
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "output_text": "ok",
                "confidence": 1.0,
                "metadata": {},
                "errors": [],
                "elapsed_ms": 5
            })
        );
    }
}
