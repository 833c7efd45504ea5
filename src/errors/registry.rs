// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::DefinitionError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("task type '{0}' is already registered")]
    DuplicateTask(String),

    #[error("workflow for task '{task_type}' failed to compile: {}", join_errors(.errors))]
    Definition {
        task_type: String,
        errors: Vec<DefinitionError>,
    },
}

fn join_errors(errors: &[DefinitionError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
