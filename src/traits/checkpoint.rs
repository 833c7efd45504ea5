use async_trait::async_trait;

use crate::errors::CheckpointError;

/// Per-thread snapshot storage for execution state.
///
/// Implementations must serialize writes for one thread id while never making different
/// thread ids wait on each other.
#[async_trait]
pub trait CheckpointStore<S>: Send + Sync {
    /// The last successfully completed state for `thread_id`, if any.
    async fn get(&self, thread_id: &str) -> Result<Option<S>, CheckpointError>;

    /// Replace the checkpoint for `thread_id`.
    async fn put(&self, thread_id: &str, state: S) -> Result<(), CheckpointError>;
}
