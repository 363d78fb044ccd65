//! Configuration and token counter trait for hierarchical text chunking

use super::error::{ChunkingError, Result};
use super::types::{ChunkType, TextChunk};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Token counting oracle
///
/// Implementations must match the tokenizer of the target embedding model,
/// otherwise the token budget is not respected by the provider.
pub trait TokenCounter: Send + Sync {
    /// Count the tokens of a single text
    fn count_tokens(&self, text: &str) -> usize;
}

/// Default number of tokens permitted per provider call.
///
/// Kept below the model limit (8191 for the OpenAI embedding models) to leave headroom.
pub const DEFAULT_MAX_CHUNK_TOKENS: usize = 4000;

/// Configuration for hierarchical text chunking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk
    pub max_chunk_tokens: usize,
    /// Upper bound of memoized token counts held during one split
    pub count_cache_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            count_cache_size: 4096,
        }
    }
}

impl ChunkingConfig {
    /// Create configuration with the given token budget
    pub fn for_budget(max_tokens: usize) -> Self {
        Self {
            max_chunk_tokens: max_tokens,
            ..Default::default()
        }
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_tokens == 0 {
            return Err(ChunkingError::configuration(
                "max_chunk_tokens must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Statistical information about one chunking operation
#[derive(Debug, Clone, Default)]
pub struct ChunkingStatistics {
    /// Total processing time
    pub total_processing_time: Duration,
    /// Time spent in the token counter
    pub token_counting_time: Duration,

    /// Input text statistics
    pub input_char_count: usize,
    pub detected_paragraph_count: usize,
    pub oversized_paragraph_count: usize,
    pub oversized_sentence_count: usize,

    /// Output chunk statistics
    pub total_chunks_created: usize,
    pub packed_chunks: usize,
    pub word_split_chunks: usize,
    pub revalidated_chunks: usize,
    pub irreducible_chunks: usize,

    /// Token statistics
    pub total_tokens: usize,
    pub max_tokens_in_chunk: usize,
    pub min_tokens_in_chunk: usize,

    /// Token counter calls vs. memoized hits
    pub counter_calls: usize,
    pub cache_hits: usize,
}

impl ChunkingStatistics {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing for total processing
    pub fn start_total_timing(&self) -> Instant {
        Instant::now()
    }

    /// Finish total timing
    pub fn finish_total_timing(&mut self, start: Instant) {
        self.total_processing_time = start.elapsed();
    }

    /// Record token counting timing
    pub fn record_token_counting_time(&mut self, duration: Duration) {
        self.token_counting_time += duration;
    }

    /// Record input text statistics
    pub fn record_input_stats(&mut self, text: &str) {
        self.input_char_count = text.chars().count();
    }

    /// Record a finished chunk
    pub fn record_chunk(&mut self, chunk: &TextChunk, budget: usize) {
        self.total_chunks_created += 1;
        match chunk.chunk_type {
            ChunkType::Packed => self.packed_chunks += 1,
            ChunkType::WordSplit => self.word_split_chunks += 1,
            ChunkType::Revalidated => self.revalidated_chunks += 1,
        }
        if chunk.is_irreducible(budget) {
            self.irreducible_chunks += 1;
        }

        self.total_tokens += chunk.token_count;
        if self.max_tokens_in_chunk == 0 || chunk.token_count > self.max_tokens_in_chunk {
            self.max_tokens_in_chunk = chunk.token_count;
        }
        if self.min_tokens_in_chunk == 0 || chunk.token_count < self.min_tokens_in_chunk {
            self.min_tokens_in_chunk = chunk.token_count;
        }
    }

    /// Average tokens per chunk
    pub fn avg_tokens_per_chunk(&self) -> f32 {
        if self.total_chunks_created == 0 {
            0.0
        } else {
            self.total_tokens as f32 / self.total_chunks_created as f32
        }
    }

    /// Get summary as string for logging
    pub fn summary(&self) -> String {
        format!(
            "Chunking Stats: {} chars -> {} chunks ({:.1} avg tokens/chunk, max {}) in {:.2}ms | \
            paragraphs: {} ({} oversized), oversized sentences: {} | \
            packed: {}, word split: {}, revalidated: {}, irreducible: {} | \
            counter calls: {}, cache hits: {}",
            self.input_char_count,
            self.total_chunks_created,
            self.avg_tokens_per_chunk(),
            self.max_tokens_in_chunk,
            self.total_processing_time.as_secs_f64() * 1000.0,
            self.detected_paragraph_count,
            self.oversized_paragraph_count,
            self.oversized_sentence_count,
            self.packed_chunks,
            self.word_split_chunks,
            self.revalidated_chunks,
            self.irreducible_chunks,
            self.counter_calls,
            self.cache_hits,
        )
    }
}

/// Memo of token counts, scoped to a single chunking operation
#[derive(Debug, Clone)]
pub struct TokenCountCache {
    counts: HashMap<String, usize>,
    /// Maximum cache size to prevent memory bloat
    max_cache_size: usize,
}

impl Default for TokenCountCache {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl TokenCountCache {
    /// Create new cache with specified max size (0 disables caching)
    pub fn new(max_size: usize) -> Self {
        Self {
            counts: HashMap::new(),
            max_cache_size: max_size,
        }
    }

    /// Get cached token count
    pub fn get(&self, text: &str) -> Option<usize> {
        self.counts.get(text).copied()
    }

    /// Cache a token count
    pub fn insert(&mut self, text: &str, count: usize) {
        if self.max_cache_size == 0 {
            return;
        }
        if self.counts.len() >= self.max_cache_size {
            // Simple eviction: clear half the cache
            let keys_to_remove: Vec<_> = self
                .counts
                .keys()
                .take(self.max_cache_size.div_ceil(2))
                .cloned()
                .collect();
            for key in keys_to_remove {
                self.counts.remove(&key);
            }
        }
        self.counts.insert(text.to_string(), count);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // one token per 4 bytes
    struct MockTokenCounter;

    impl TokenCounter for MockTokenCounter {
        fn count_tokens(&self, text: &str) -> usize {
            text.len().div_ceil(4)
        }
    }

    #[test]
    fn test_default_config() {
        let config = ChunkingConfig::default();
        assert_eq!(config.max_chunk_tokens, 4000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ChunkingConfig::for_budget(0);
        assert!(matches!(
            config.validate(),
            Err(ChunkingError::Configuration(_))
        ));

        let config = ChunkingConfig::for_budget(1);
        assert!(config.validate().is_ok());
        assert_eq!(config.count_cache_size, 4096);
    }

    #[test]
    fn test_mock_token_counter() {
        let counter = MockTokenCounter;
        assert_eq!(counter.count_tokens("hello world test"), 4);
        assert_eq!(counter.count_tokens(""), 0);
        assert_eq!(counter.count_tokens("longer text here"), 4);
    }

    #[test]
    fn test_chunking_statistics() {
        let mut stats = ChunkingStatistics::new();
        stats.record_input_stats("Sample text for testing");
        assert_eq!(stats.input_char_count, 23);

        stats.record_chunk(
            &TextChunk::new("a b".to_string(), 50, ChunkType::Packed, 0),
            100,
        );
        stats.record_chunk(
            &TextChunk::new("c d".to_string(), 75, ChunkType::WordSplit, 1),
            100,
        );
        stats.record_chunk(
            &TextChunk::new("enormous".to_string(), 120, ChunkType::WordSplit, 2),
            100,
        );
        stats.record_token_counting_time(Duration::from_millis(10));

        assert_eq!(stats.total_chunks_created, 3);
        assert_eq!(stats.packed_chunks, 1);
        assert_eq!(stats.word_split_chunks, 2);
        assert_eq!(stats.irreducible_chunks, 1);
        assert_eq!(stats.total_tokens, 245);
        assert_eq!(stats.max_tokens_in_chunk, 120);
        assert_eq!(stats.min_tokens_in_chunk, 50);
        assert_eq!(stats.token_counting_time, Duration::from_millis(10));

        let summary = stats.summary();
        assert!(summary.contains("3 chunks"));
        assert!(summary.contains("irreducible: 1"));
    }

    #[test]
    fn test_token_count_cache() {
        let mut cache = TokenCountCache::new(3);
        assert!(cache.get("test").is_none());
        cache.insert("test", 5);
        assert_eq!(cache.get("test"), Some(5));

        cache.insert("test2", 10);
        cache.insert("test3", 15);
        cache.insert("test4", 20); // triggers eviction
        assert!(cache.len() <= 3);
        assert_eq!(cache.get("test4"), Some(20));
    }

    #[test]
    fn test_disabled_cache() {
        let mut cache = TokenCountCache::new(0);
        cache.insert("test", 5);
        assert!(cache.get("test").is_none());
        assert!(cache.is_empty());
    }
}
