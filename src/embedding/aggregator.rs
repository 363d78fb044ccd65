//! Text to single embedding vector, splitting when the text exceeds the token budget

use super::config::EmbeddingConfig;
use super::error::{EmbeddingError, Result};
use super::merger::EmbeddingMerger;
use super::provider::EmbeddingProvider;
use crate::text::chunking::{
    ChunkingConfig, HierarchicalChunker, TextChunk, TokenCounter, split_text,
};
use crate::text::normalize;
use std::sync::Arc;
use tracing::{error, info};

/// Embeds arbitrary text with a provider whose input is limited in tokens.
///
/// Text is normalized first. If it fits the budget it is embedded with one
/// provider call and that vector is returned unchanged. Otherwise it is split
/// into chunks, every chunk is embedded in order, and the element-wise mean of
/// the chunk vectors is returned.
///
/// The result always has the dimensionality of a single provider call. When the
/// text was split, the mean is a heuristic approximation of the meaning of the
/// whole text, not an exact embedding of it.
pub struct EmbeddingAggregator<T: TokenCounter, P: EmbeddingProvider> {
    chunker: HierarchicalChunker<T>,
    provider: P,
    model: String,
}

impl<T: TokenCounter, P: EmbeddingProvider> EmbeddingAggregator<T, P> {
    pub fn new(
        token_counter: Arc<T>,
        provider: P,
        model: impl Into<String>,
        max_tokens: usize,
    ) -> Result<Self> {
        let chunker = HierarchicalChunker::with_shared_counter(
            ChunkingConfig::for_budget(max_tokens),
            token_counter,
        )?;
        Ok(Self {
            chunker,
            provider,
            model: model.into(),
        })
    }

    pub fn from_config(
        config: &EmbeddingConfig,
        token_counter: Arc<T>,
        provider: P,
    ) -> Result<Self> {
        config.validate()?;
        let chunker =
            HierarchicalChunker::with_shared_counter(config.chunking_config(), token_counter)?;
        Ok(Self {
            chunker,
            provider,
            model: config.model.clone(),
        })
    }

    /// Embed `text` into one vector; any provider failure aborts the whole call
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let counter = self.chunker.token_counter();
        embed_text(
            text,
            &self.provider,
            &self.model,
            self.max_tokens(),
            |t| counter.count_tokens(t),
            |t| self.chunker.chunk(t),
        )
    }

    /// Embed already split chunks, one provider call each, in order
    pub fn embed_chunks(&self, chunks: &[TextChunk]) -> Result<Vec<Vec<f32>>> {
        embed_chunk_list(chunks, &self.provider, &self.model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_tokens(&self) -> usize {
        self.chunker.config().max_chunk_tokens
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Embed `text` with the given collaborators, see [`EmbeddingAggregator`]
pub fn embed<T, P>(
    text: &str,
    provider: &P,
    token_counter: &T,
    budget: usize,
    model: &str,
) -> Result<Vec<f32>>
where
    T: TokenCounter + ?Sized,
    P: EmbeddingProvider + ?Sized,
{
    if budget == 0 {
        return Err(EmbeddingError::configuration("budget must be greater than 0"));
    }
    embed_text(
        text,
        provider,
        model,
        budget,
        |t| token_counter.count_tokens(t),
        |t| split_text(t, budget, token_counter),
    )
}

fn embed_text<P: EmbeddingProvider + ?Sized>(
    text: &str,
    provider: &P,
    model: &str,
    budget: usize,
    count_tokens: impl Fn(&str) -> usize,
    split: impl FnOnce(&str) -> Vec<TextChunk>,
) -> Result<Vec<f32>> {
    info!("Embedding generation started");
    let normalized = normalize(text);

    let token_count = count_tokens(&normalized);
    info!("Total token count: {}", token_count);

    if token_count <= budget {
        info!("Embedding as a single chunk");
        let embedding = provider.create_embedding(&normalized, model)?;
        info!("Embedding generation completed");
        return Ok(embedding);
    }

    info!("Text exceeds {} tokens, splitting into chunks", budget);
    let chunks = split(&normalized);
    let embeddings = embed_chunk_list(&chunks, provider, model)?;

    info!("Averaging {} chunk embeddings", embeddings.len());
    let merged = EmbeddingMerger::merge_by_average(&embeddings)?;
    info!("Embedding generation completed");
    Ok(merged)
}

fn embed_chunk_list<P: EmbeddingProvider + ?Sized>(
    chunks: &[TextChunk],
    provider: &P,
    model: &str,
) -> Result<Vec<Vec<f32>>> {
    let total = chunks.len();
    let mut embeddings = Vec::with_capacity(total);
    for (i, chunk) in chunks.iter().enumerate() {
        info!(
            "Processing chunk {}/{}: {} tokens",
            i + 1,
            total,
            chunk.token_count
        );
        let embedding = provider
            .create_embedding(&chunk.content, model)
            .inspect_err(|e| {
                error!("Chunk {} failed ({}): {}", i + 1, e.category(), e);
                error!(
                    "Chunk length: {} chars, {} tokens",
                    chunk.char_length(),
                    chunk.token_count
                );
            })?;
        info!("Chunk {} embedded", i + 1);
        embeddings.push(embedding);
    }
    Ok(embeddings)
}
