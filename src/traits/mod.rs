pub mod checkpoint;
pub mod generator;
pub mod node;

pub use checkpoint::CheckpointStore;
pub use generator::TextGenerator;
pub use node::{node_fn, FnNode, Node, Router};
