use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use crate::errors::NodeError;

/// A named asynchronous state transformer.
///
/// The node receives the whole current state and returns the whole next state. Fields it
/// does not touch must be carried forward by returning the same value.
#[async_trait]
pub trait Node<S>: Send + Sync {
    async fn run(&self, state: S) -> Result<S, NodeError>;
}

/// Maps the state after a node ran to a label in that node's label map.
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Adapter that lets an async closure act as a [`Node`].
pub struct FnNode<F> {
    f: F,
}

/// Wrap an async function or closure as a node.
///
/// ```
/// use lessonflow::errors::NodeError;
/// use lessonflow::traits::node_fn;
///
/// let double = node_fn(|n: u32| async move { Ok::<_, NodeError>(n * 2) });
/// # let _ = double;
/// ```
pub fn node_fn<S, F, Fut>(f: F) -> FnNode<F>
where
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S, NodeError>> + Send,
{
    FnNode { f }
}

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<F>
where
    S: Send + 'static,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S, NodeError>> + Send,
{
    async fn run(&self, state: S) -> Result<S, NodeError> {
        (self.f)(state).await
    }
}
