// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::{CompiledWorkflow, WorkflowDefinition, WorkflowState};
use crate::errors::RegistryError;
use crate::tasks::{self, TutorState};
use crate::traits::{CheckpointStore, TextGenerator};

/// Task type to its one compiled workflow.
///
/// Built once at startup and then shared read-only; lookups never mutate.
pub struct TaskRegistry<S> {
    workflows: HashMap<String, CompiledWorkflow<S>>,
}

impl<S: WorkflowState> Default for TaskRegistry<S> {
    fn default() -> Self {
        Self {
            workflows: HashMap::new(),
        }
    }
}

impl<S: WorkflowState> TaskRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compiled workflow. A task type can only be registered once.
    pub fn register(
        &mut self,
        task_type: impl Into<String>,
        workflow: CompiledWorkflow<S>,
    ) -> Result<(), RegistryError> {
        let task_type = task_type.into();
        if self.workflows.contains_key(&task_type) {
            return Err(RegistryError::DuplicateTask(task_type));
        }
        self.workflows.insert(task_type, workflow);
        Ok(())
    }

    /// Compile `definition` against `store` and register it.
    pub fn register_definition(
        &mut self,
        task_type: impl Into<String>,
        definition: &WorkflowDefinition<S>,
        store: Arc<dyn CheckpointStore<S>>,
    ) -> Result<(), RegistryError> {
        let task_type = task_type.into();
        let workflow = definition
            .compile_with_checkpointer(store)
            .map_err(|errors| RegistryError::Definition {
                task_type: task_type.clone(),
                errors,
            })?;
        self.register(task_type, workflow)
    }

    pub fn get(&self, task_type: &str) -> Option<&CompiledWorkflow<S>> {
        self.workflows.get(task_type)
    }

    /// Registered task types in sorted order.
    pub fn task_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.workflows.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

impl TaskRegistry<TutorState> {
    /// Registry with the standard tutoring tasks, all sharing `store`.
    pub fn tutoring(
        generator: Arc<dyn TextGenerator>,
        config: &EngineConfig,
        store: Arc<dyn CheckpointStore<TutorState>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        registry.register_definition(
            tasks::CHAT,
            &tasks::chat::workflow(Arc::clone(&generator), config.task(tasks::CHAT)),
            Arc::clone(&store),
        )?;
        registry.register_definition(
            tasks::FLASHCARDS,
            &tasks::flashcards::workflow(
                Arc::clone(&generator),
                config.task(tasks::FLASHCARDS),
                &config.parser,
            ),
            Arc::clone(&store),
        )?;
        registry.register_definition(
            tasks::QUIZ,
            &tasks::quiz::workflow(generator, config.task(tasks::QUIZ), &config.parser),
            store,
        )?;

        Ok(registry)
    }
}
