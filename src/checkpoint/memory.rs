// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::CheckpointError;
use crate::observability::messages::checkpoint::CheckpointWritten;
use crate::observability::messages::StructuredLog;
use crate::traits::CheckpointStore;

/// A stored snapshot and how many times the thread has been written.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint<S> {
    pub state: S,
    pub version: u64,
}

type Slot<S> = Arc<Mutex<Option<Checkpoint<S>>>>;

/// Process-local checkpoint store.
///
/// Each thread id owns a slot guarded by its own async mutex: writes to one thread are
/// serialized, writes to different threads never contend. The map shard lock is only held
/// long enough to clone the slot handle, never across an await.
pub struct InMemoryCheckpointStore<S> {
    slots: DashMap<String, Slot<S>>,
}

impl<S> Default for InMemoryCheckpointStore<S> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }
}

impl<S> InMemoryCheckpointStore<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with a slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Write count for `thread_id`, `0` if it was never written.
    pub async fn version(&self, thread_id: &str) -> u64 {
        match self.existing(thread_id) {
            Some(slot) => slot.lock().await.as_ref().map_or(0, |c| c.version),
            None => 0,
        }
    }

    fn existing(&self, thread_id: &str) -> Option<Slot<S>> {
        self.slots.get(thread_id).map(|slot| Arc::clone(slot.value()))
    }

    fn slot(&self, thread_id: &str) -> Slot<S> {
        Arc::clone(
            self.slots
                .entry(thread_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(None)))
                .value(),
        )
    }
}

#[async_trait]
impl<S> CheckpointStore<S> for InMemoryCheckpointStore<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn get(&self, thread_id: &str) -> Result<Option<S>, CheckpointError> {
        let Some(slot) = self.existing(thread_id) else {
            return Ok(None);
        };
        let guard = slot.lock().await;
        Ok(guard.as_ref().map(|checkpoint| checkpoint.state.clone()))
    }

    async fn put(&self, thread_id: &str, state: S) -> Result<(), CheckpointError> {
        let slot = self.slot(thread_id);
        let mut guard = slot.lock().await;
        let version = guard.as_ref().map_or(0, |c| c.version) + 1;
        *guard = Some(Checkpoint { state, version });
        drop(guard);

        CheckpointWritten { thread_id, version }.log();
        Ok(())
    }
}
