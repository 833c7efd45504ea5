//! The contract between the engine and a workflow's state record.

/// State threaded through a workflow.
///
/// Each workflow family defines its own typed record; the engine only needs to append to
/// the execution trace and, when a thread already has a checkpoint, let the new state pick
/// up what it wants from the previous one.
pub trait WorkflowState: Clone + Send + Sync + 'static {
    /// Append a visited node name to the execution trace.
    fn record_visit(&mut self, node: &str);

    /// Node names visited so far, in order.
    fn trace(&self) -> &[String];

    /// Called before the first node runs when `thread_id` already has a checkpoint.
    ///
    /// The default keeps nothing from the previous state.
    fn carry_over(&mut self, previous: &Self) {
        let _ = previous;
    }
}
