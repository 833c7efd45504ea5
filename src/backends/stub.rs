// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::marker::PhantomData;
use std::time::Duration;

use crate::errors::{CheckpointError, NodeError};
use crate::traits::{CheckpointStore, Node};

/// A node that returns its state unchanged
pub struct StubNode;

#[async_trait]
impl<S: Send + 'static> Node<S> for StubNode {
    async fn run(&self, state: S) -> Result<S, NodeError> {
        Ok(state)
    }
}

/// A node that always fails for testing failure scenarios
pub struct FailingNode {
    pub message: String,
}

impl FailingNode {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl<S: Send + 'static> Node<S> for FailingNode {
    async fn run(&self, _state: S) -> Result<S, NodeError> {
        Err(NodeError::Failed(self.message.clone()))
    }
}

/// A node that waits before passing state through, for timeout and cancellation tests
pub struct SlowNode {
    pub delay: Duration,
}

#[async_trait]
impl<S: Send + 'static> Node<S> for SlowNode {
    async fn run(&self, state: S) -> Result<S, NodeError> {
        tokio::time::sleep(self.delay).await;
        Ok(state)
    }
}

/// A checkpoint store whose every call fails
pub struct FailingCheckpointStore<S> {
    _state: PhantomData<fn() -> S>,
}

impl<S> Default for FailingCheckpointStore<S> {
    fn default() -> Self {
        Self {
            _state: PhantomData,
        }
    }
}

#[async_trait]
impl<S: Send + 'static> CheckpointStore<S> for FailingCheckpointStore<S> {
    async fn get(&self, _thread_id: &str) -> Result<Option<S>, CheckpointError> {
        Err(CheckpointError::Unavailable("store offline".to_string()))
    }

    async fn put(&self, _thread_id: &str, _state: S) -> Result<(), CheckpointError> {
        Err(CheckpointError::Unavailable("store offline".to_string()))
    }
}
