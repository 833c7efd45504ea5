// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::boundary::{InvocationSeed, ResponseEnvelope};
use crate::config::{ExecutionOptions, TaskRegistry};
use crate::engine::Invocation;
use crate::errors::InvocationError;
use crate::observability::messages::boundary::{InvocationAborted, TaskDispatched};
use crate::observability::messages::StructuredLog;
use crate::tasks::TutorState;

/// Runs registered tasks and converts every outcome into a [`ResponseEnvelope`].
///
/// Checkpoints are keyed by `"{task_type}:{session_id}"`, so the tasks of one session
/// keep separate histories.
#[derive(Clone)]
pub struct InvocationBoundary {
    registry: Arc<TaskRegistry<TutorState>>,
    execution: ExecutionOptions,
}

impl InvocationBoundary {
    pub fn new(registry: Arc<TaskRegistry<TutorState>>, execution: ExecutionOptions) -> Self {
        Self {
            registry,
            execution,
        }
    }

    pub fn registry(&self) -> &TaskRegistry<TutorState> {
        &self.registry
    }

    pub fn thread_id(task_type: &str, session_id: &str) -> String {
        format!("{}:{}", task_type, session_id)
    }

    /// Run `task_type` to completion or until the configured timeout.
    pub async fn invoke(&self, task_type: &str, seed: InvocationSeed) -> ResponseEnvelope {
        self.invoke_with_cancel(task_type, seed, &CancellationToken::new())
            .await
    }

    /// Like [`invoke`](Self::invoke), but gives up as soon as `cancel` fires.
    ///
    /// A timed-out or cancelled invocation writes no checkpoint.
    pub async fn invoke_with_cancel(
        &self,
        task_type: &str,
        seed: InvocationSeed,
        cancel: &CancellationToken,
    ) -> ResponseEnvelope {
        let started = Instant::now();
        let thread_id = Self::thread_id(task_type, &seed.session_id);

        match self.try_invoke(task_type, seed, cancel).await {
            Ok(invocation) => {
                ResponseEnvelope::from_invocation(task_type, invocation, started.elapsed())
            }
            Err(error) => {
                let elapsed = started.elapsed();
                let location = match &error {
                    InvocationError::Execution(execution) => execution.location(),
                    _ => None,
                };
                InvocationAborted {
                    task_type,
                    thread_id: &thread_id,
                    node: location.map(|(node, _)| node),
                    step: location.map(|(_, step)| step),
                    error: &error,
                    elapsed,
                }
                .log();
                ResponseEnvelope::failure(task_type, &error, elapsed)
            }
        }
    }

    /// Run `task_type` and return the raw outcome instead of an envelope.
    ///
    /// # Errors
    ///
    /// * [`InvocationError::UnknownTask`] - nothing is registered under `task_type`
    /// * [`InvocationError::TimedOut`] - the configured wall-clock limit passed
    /// * [`InvocationError::Cancelled`] - `cancel` fired first
    /// * [`InvocationError::Execution`] - the workflow failed
    pub async fn try_invoke(
        &self,
        task_type: &str,
        seed: InvocationSeed,
        cancel: &CancellationToken,
    ) -> Result<Invocation<TutorState>, InvocationError> {
        let workflow = self
            .registry
            .get(task_type)
            .ok_or_else(|| InvocationError::UnknownTask(task_type.to_string()))?;

        let thread_id = Self::thread_id(task_type, &seed.session_id);
        let dispatched = TaskDispatched {
            task_type,
            thread_id: &thread_id,
            input_size: seed.input_text.len(),
        };
        let span = dispatched.span("dispatch");
        dispatched.log();

        let timeout = self.execution.timeout();
        let budget = self.execution.step_budget();
        let run = tokio::time::timeout(timeout, workflow.invoke(seed.into_state(), &thread_id, budget));

        async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(InvocationError::Cancelled),
                outcome = run => match outcome {
                    Ok(result) => result.map_err(InvocationError::from),
                    Err(_) => Err(InvocationError::TimedOut(timeout)),
                },
            }
        }
        .instrument(span)
        .await
    }
}
