use geocat_core::{DescriptorError, TreeError};
use thiserror::Error;

/// Errors produced while mirroring an entity onto the resource tree.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to persist {path}: {source}")]
    Descriptor {
        path: String,
        #[source]
        source: DescriptorError,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: String,
        #[source]
        source: TreeError,
    },

    /// A layer whose resource is unknown has no location in the tree.
    #[error("layer '{workspace}:{layer}' wraps unknown resource '{resource}'")]
    UnknownResource {
        workspace: String,
        layer: String,
        resource: String,
    },
}
