//! Hierarchical text chunking for token-bounded embedding requests
//!
//! Text is split along paragraph, sentence and word boundaries, in that order of
//! preference, and the resulting units are packed greedily so that as few chunks
//! as possible are sent to the embedding provider.

pub mod chunker;
pub mod config;
pub mod error;
pub mod types;

// Re-export main public interfaces
pub use chunker::{HierarchicalChunker, split_text};
pub use config::{
    ChunkingConfig, ChunkingStatistics, DEFAULT_MAX_CHUNK_TOKENS, TokenCountCache, TokenCounter,
};
pub use error::{ChunkingError, Result};
pub use types::{ChunkType, TextChunk};
