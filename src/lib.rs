pub mod embedding;
pub mod text;
pub mod util;

pub use embedding::{
    EmbeddingAggregator, EmbeddingConfig, EmbeddingError, EmbeddingProvider, ProviderError, embed,
};
pub use text::chunking::{TextChunk, TokenCounter, split_text};
pub use text::{TiktokenCounter, normalize};
