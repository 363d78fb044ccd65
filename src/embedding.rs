//! Embedding of texts longer than the provider's input limit
//!
//! [`EmbeddingAggregator`] normalizes a text, splits it with the hierarchical
//! chunker when it does not fit the token budget, embeds every chunk through an
//! [`EmbeddingProvider`] and averages the resulting vectors.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod merger;
pub mod openai;
pub mod provider;

pub use aggregator::{EmbeddingAggregator, embed};
pub use config::EmbeddingConfig;
pub use error::{EmbeddingError, Result};
pub use merger::EmbeddingMerger;
pub use openai::OpenAiEmbeddingProvider;
pub use provider::{EmbeddingProvider, ProviderError};
