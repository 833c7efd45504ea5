pub mod metadata;

pub use metadata::{merge_metadata_with_prefix, Metadata};
