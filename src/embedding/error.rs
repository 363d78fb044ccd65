//! Error types for the embedding pipeline

use super::provider::ProviderError;
use crate::text::chunking::ChunkingError;

#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
    /// The provider failed; the whole operation is aborted
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Chunk vectors disagree in length; never coerced
    #[error("Dimension mismatch: vector {index} has {actual} values, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("No embeddings to merge")]
    NoEmbeddings,

    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for embedding operations
pub type Result<T> = std::result::Result<T, EmbeddingError>;

impl EmbeddingError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}
