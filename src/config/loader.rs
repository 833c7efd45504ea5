// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_INVOCATION_TIMEOUT_MS, DEFAULT_ITEM_COUNT, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_PARSE_INPUT_BYTES, DEFAULT_MAX_TOKENS, DEFAULT_STEP_BUDGET, DEFAULT_TEMPERATURE,
    MAX_INVOCATION_TIMEOUT_MS, MAX_STEP_BUDGET, MIN_STEP_BUDGET,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the tutoring engine.
///
/// Every section is optional; a missing section, or a missing field inside one, falls back
/// to the built-in defaults in [`crate::config::consts`]. Unknown keys are rejected so a
/// misspelled setting does not silently fall back to its default.
///
/// # Fields
/// * `execution` - Step budget and wall-clock limit applied to every invocation
/// * `parser` - Limits and heuristics for structured output recovery
/// * `tasks` - Per-task generation options keyed by task type
///
/// # Example
/// ```yaml
/// execution:
///   step_budget: 25
///   timeout_ms: 60000
/// parser:
///   required_fields: [front, back]
/// tasks:
///   flashcards:
///     max_attempts: 2
///     item_count: 8
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub execution: ExecutionOptions,
    pub parser: ParserOptions,
    pub tasks: BTreeMap<String, TaskOptions>,
}

impl EngineConfig {
    /// Options for `task_type`, or the defaults when the task is not configured.
    pub fn task(&self, task_type: &str) -> TaskOptions {
        self.tasks.get(task_type).cloned().unwrap_or_default()
    }

    /// Every problem with the configured values, empty when the config is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.execution.step_budget == Some(0) {
            problems.push("execution.step_budget must be at least 1".to_string());
        }
        if self.execution.timeout_ms == Some(0) {
            problems.push("execution.timeout_ms must be greater than 0".to_string());
        }
        if self.parser.max_input_bytes == Some(0) {
            problems.push("parser.max_input_bytes must be greater than 0".to_string());
        }
        if self.parser.required_fields.iter().any(|f| f.trim().is_empty()) {
            problems.push("parser.required_fields must not contain blank names".to_string());
        }

        for (task_type, options) in &self.tasks {
            if options.max_attempts == Some(0) {
                problems.push(format!("tasks.{task_type}.max_attempts must be at least 1"));
            }
            if options.max_tokens == Some(0) {
                problems.push(format!("tasks.{task_type}.max_tokens must be greater than 0"));
            }
            if options.item_count == Some(0) {
                problems.push(format!("tasks.{task_type}.item_count must be at least 1"));
            }
            if let Some(temperature) = options.temperature {
                if !(0.0..=2.0).contains(&temperature) {
                    problems.push(format!(
                        "tasks.{task_type}.temperature must be between 0.0 and 2.0, got {temperature}"
                    ));
                }
            }
        }

        problems
    }
}

/// Limits applied by the invocation boundary and the engine.
///
/// # Example
/// ```
/// use lessonflow::config::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     step_budget: Some(50_000),
///     timeout_ms: None,
/// };
/// assert_eq!(options.step_budget(), 1_000); // Clamped to maximum
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionOptions {
    pub step_budget: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl ExecutionOptions {
    /// Configured step budget clamped to `[MIN_STEP_BUDGET, MAX_STEP_BUDGET]`.
    pub fn step_budget(&self) -> usize {
        self.step_budget
            .unwrap_or(DEFAULT_STEP_BUDGET)
            .clamp(MIN_STEP_BUDGET, MAX_STEP_BUDGET)
    }

    pub fn timeout(&self) -> Duration {
        let ms = self
            .timeout_ms
            .unwrap_or(DEFAULT_INVOCATION_TIMEOUT_MS)
            .clamp(1, MAX_INVOCATION_TIMEOUT_MS);
        Duration::from_millis(ms)
    }
}

/// Structured output recovery settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOptions {
    pub max_input_bytes: Option<usize>,
    /// Fields a recovered fragment must carry to count, on top of each task's own
    pub required_fields: Vec<String>,
}

impl ParserOptions {
    pub fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
            .unwrap_or(DEFAULT_MAX_PARSE_INPUT_BYTES)
            .max(1)
    }
}

/// Generation options for one task type.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TaskOptions {
    pub max_attempts: Option<u32>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub item_count: Option<u32>,
}

impl TaskOptions {
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS).max(1)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
            .unwrap_or(DEFAULT_TEMPERATURE)
            .clamp(0.0, 2.0)
    }

    pub fn item_count(&self) -> u32 {
        self.item_count.unwrap_or(DEFAULT_ITEM_COUNT).max(1)
    }
}

/// Load a config from a YAML (`.yaml`, `.yml`) or TOML (`.toml`) file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let read = || {
        fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    match extension.as_str() {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&read()?)?),
        "toml" => Ok(toml::from_str(&read()?)?),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load a config and reject values that cannot be clamped into something meaningful.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let cfg = load_config(path)?;

    let problems = cfg.problems();
    if !problems.is_empty() {
        return Err(ConfigError::Invalid(problems));
    }

    Ok(cfg)
}
