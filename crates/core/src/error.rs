use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the resource tree accessor.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),
}

impl TreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TreeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by an [`EntityCodec`](crate::codec::EntityCodec).
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Deserialization error: {0}")]
    Deserialize(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Failure reading or writing one descriptor file: either the tree or the codec gave up.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
