//! Hierarchical chunker: paragraph > sentence > word splitting with greedy repacking

use super::{
    config::{ChunkingConfig, ChunkingStatistics, TokenCountCache, TokenCounter},
    error::Result,
    types::{ChunkType, TextChunk},
};
use crate::text::SentenceSplitter;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Hierarchical text chunker for token-bounded embedding input
///
/// Text is split on blank lines into paragraphs. Paragraphs that fit the budget
/// are packed greedily into a running chunk; oversized paragraphs are split into
/// sentences which feed the same running chunk, and oversized sentences are
/// packed word by word. A final pass re-splits any chunk whose joined form
/// still exceeds the budget.
///
/// The chunker keeps no state between calls.
pub struct HierarchicalChunker<T: TokenCounter> {
    config: ChunkingConfig,
    token_counter: Arc<T>,
    sentence_splitter: SentenceSplitter,
}

impl<T: TokenCounter> HierarchicalChunker<T> {
    /// Create a new hierarchical chunker with token counter
    pub fn new(config: ChunkingConfig, token_counter: T) -> Result<Self> {
        Self::with_shared_counter(config, Arc::new(token_counter))
    }

    /// Create a chunker sharing its token counter with other components
    pub fn with_shared_counter(config: ChunkingConfig, token_counter: Arc<T>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            token_counter,
            sentence_splitter: SentenceSplitter::default(),
        })
    }

    /// Split `text` into chunks of at most `max_chunk_tokens` tokens
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        self.chunk_with_statistics(text).0
    }

    /// Split `text` and report what the split did
    pub fn chunk_with_statistics(&self, text: &str) -> (Vec<TextChunk>, ChunkingStatistics) {
        let mut pass = SplitPass::new(
            self.token_counter.as_ref(),
            self.config.max_chunk_tokens,
            self.config.count_cache_size,
        );
        let chunks = pass.run(&self.sentence_splitter, text);
        (chunks, pass.statistics)
    }

    /// Get configuration reference
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn token_counter(&self) -> &Arc<T> {
        &self.token_counter
    }
}

/// Split `text` into chunks of at most `budget` tokens with default settings
pub fn split_text<T: TokenCounter + ?Sized>(
    text: &str,
    budget: usize,
    token_counter: &T,
) -> Vec<TextChunk> {
    let cache_size = ChunkingConfig::default().count_cache_size;
    let mut pass = SplitPass::new(token_counter, budget, cache_size);
    pass.run(&SentenceSplitter::default(), text)
}

/// Units waiting to be joined into one chunk, with their summed token count
#[derive(Debug, Default)]
struct RunningChunk<'a> {
    parts: Vec<&'a str>,
    length: usize,
}

impl<'a> RunningChunk<'a> {
    /// Add a unit, flushing first if it would push the chunk over `budget`.
    ///
    /// Returns the flushed content, if any. A unit that alone exceeds the
    /// budget still becomes the sole part of the next chunk.
    fn offer(&mut self, unit: &'a str, tokens: usize, budget: usize) -> Option<String> {
        let flushed = if self.length.saturating_add(tokens) > budget {
            self.take()
        } else {
            None
        };
        self.parts.push(unit);
        self.length = self.length.saturating_add(tokens);
        flushed
    }

    fn take(&mut self) -> Option<String> {
        if self.parts.is_empty() {
            return None;
        }
        let content = self.parts.join(" ");
        self.parts.clear();
        self.length = 0;
        Some(content)
    }
}

/// State of one split call
struct SplitPass<'c, T: TokenCounter + ?Sized> {
    token_counter: &'c T,
    budget: usize,
    cache: TokenCountCache,
    statistics: ChunkingStatistics,
    pending: Vec<(String, ChunkType)>,
}

impl<'c, T: TokenCounter + ?Sized> SplitPass<'c, T> {
    fn new(token_counter: &'c T, budget: usize, cache_size: usize) -> Self {
        Self {
            token_counter,
            budget,
            cache: TokenCountCache::new(cache_size),
            statistics: ChunkingStatistics::new(),
            pending: Vec::new(),
        }
    }

    fn run(&mut self, splitter: &SentenceSplitter, text: &str) -> Vec<TextChunk> {
        debug!(
            "Starting hierarchical chunking for text of {} characters, budget {} tokens",
            text.len(),
            self.budget
        );
        let total_start = self.statistics.start_total_timing();
        self.statistics.record_input_stats(text);

        let mut running = RunningChunk::default();
        for paragraph in splitter.paragraphs(text) {
            self.statistics.detected_paragraph_count += 1;
            let paragraph_tokens = self.count(paragraph);
            if paragraph_tokens <= self.budget {
                self.offer(&mut running, paragraph, paragraph_tokens, ChunkType::Packed);
                continue;
            }

            debug!(
                "Paragraph too large ({} tokens), applying sentence splitting",
                paragraph_tokens
            );
            self.statistics.oversized_paragraph_count += 1;
            self.flush(&mut running, ChunkType::Packed);
            for sentence in splitter.sentences(paragraph) {
                let sentence_tokens = self.count(sentence);
                if sentence_tokens <= self.budget {
                    self.offer(&mut running, sentence, sentence_tokens, ChunkType::Packed);
                } else {
                    debug!(
                        "Sentence too large ({} tokens), applying word splitting",
                        sentence_tokens
                    );
                    self.statistics.oversized_sentence_count += 1;
                    self.flush(&mut running, ChunkType::Packed);
                    self.split_words(sentence);
                }
            }
        }
        self.flush(&mut running, ChunkType::Packed);

        let chunks = self.revalidate();

        self.statistics.finish_total_timing(total_start);
        info!("Hierarchical chunking completed: {} chunks", chunks.len());
        debug!("{}", self.statistics.summary());
        chunks
    }

    /// Pack the words of an oversized sentence into chunks of their own
    fn split_words(&mut self, sentence: &str) {
        let mut words = RunningChunk::default();
        for word in SentenceSplitter::words(sentence) {
            let word_tokens = self.count(word);
            self.offer(&mut words, word, word_tokens, ChunkType::WordSplit);
        }
        self.flush(&mut words, ChunkType::WordSplit);
    }

    fn offer<'a>(
        &mut self,
        running: &mut RunningChunk<'a>,
        unit: &'a str,
        tokens: usize,
        chunk_type: ChunkType,
    ) {
        if let Some(content) = running.offer(unit, tokens, self.budget) {
            self.pending.push((content, chunk_type));
        }
    }

    fn flush(&mut self, running: &mut RunningChunk<'_>, chunk_type: ChunkType) {
        if let Some(content) = running.take() {
            self.pending.push((content, chunk_type));
        }
    }

    /// Re-split at word level every chunk that joining pushed over the budget
    fn revalidate(&mut self) -> Vec<TextChunk> {
        let pending = std::mem::take(&mut self.pending);
        let mut chunks: Vec<TextChunk> = Vec::with_capacity(pending.len());

        for (content, chunk_type) in pending {
            let tokens = self.count(&content);
            if tokens <= self.budget || SentenceSplitter::words(&content).nth(1).is_none() {
                self.push_chunk(&mut chunks, content, tokens, chunk_type);
                continue;
            }

            debug!(
                "Chunk still exceeds budget after joining ({} > {} tokens), re-splitting by words",
                tokens, self.budget
            );
            let mut pieces = Vec::new();
            let mut running = RunningChunk::default();
            for word in SentenceSplitter::words(&content) {
                let word_tokens = self.count(word);
                if let Some(piece) = running.offer(word, word_tokens, self.budget) {
                    self.fit_words(&piece, &mut pieces);
                }
            }
            if let Some(piece) = running.take() {
                self.fit_words(&piece, &mut pieces);
            }
            for piece in pieces {
                let piece_tokens = self.count(&piece);
                self.push_chunk(&mut chunks, piece, piece_tokens, ChunkType::Revalidated);
            }
        }
        chunks
    }

    /// Halve a repacked piece until every part fits or is a single word.
    ///
    /// Only reached when the tokenizer counts a joined piece higher than the
    /// sum of its words.
    fn fit_words(&mut self, piece: &str, out: &mut Vec<String>) {
        let words: Vec<&str> = SentenceSplitter::words(piece).collect();
        if words.len() <= 1 || self.count(piece) <= self.budget {
            out.push(piece.to_string());
            return;
        }
        let (left, right) = words.split_at(words.len() / 2);
        self.fit_words(&left.join(" "), out);
        self.fit_words(&right.join(" "), out);
    }

    fn push_chunk(
        &mut self,
        chunks: &mut Vec<TextChunk>,
        content: String,
        tokens: usize,
        chunk_type: ChunkType,
    ) {
        let chunk = TextChunk::new(content, tokens, chunk_type, chunks.len());
        self.statistics.record_chunk(&chunk, self.budget);
        chunks.push(chunk);
    }

    fn count(&mut self, text: &str) -> usize {
        if let Some(cached) = self.cache.get(text) {
            self.statistics.cache_hits += 1;
            return cached;
        }
        let start = Instant::now();
        let tokens = self.token_counter.count_tokens(text);
        self.statistics.record_token_counting_time(start.elapsed());
        self.statistics.counter_calls += 1;
        self.cache.insert(text, tokens);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::chunking::error::ChunkingError;
    use crate::text::normalize;
    use itertools::Itertools;
    use proptest::prelude::*;

    // one token per whitespace separated word: joining never adds tokens
    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count_tokens(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    // one token per 4 bytes: joining can add a token
    struct CharCounter;

    impl TokenCounter for CharCounter {
        fn count_tokens(&self, text: &str) -> usize {
            text.len().div_ceil(4)
        }
    }

    fn contents(chunks: &[TextChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_chunker_creation() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::default(), WordCounter).unwrap();
        assert_eq!(chunker.config().max_chunk_tokens, 4000);

        let result = HierarchicalChunker::new(ChunkingConfig::for_budget(0), WordCounter);
        assert!(matches!(result, Err(ChunkingError::Configuration(_))));
    }

    #[test]
    fn test_empty_text() {
        let chunker =
            HierarchicalChunker::new(ChunkingConfig::for_budget(10), WordCounter).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk(" \n\n \t\n\n").is_empty());
    }

    #[test]
    fn test_text_within_budget() {
        let chunker =
            HierarchicalChunker::new(ChunkingConfig::for_budget(100), WordCounter).unwrap();
        let chunks = chunker.chunk("First paragraph here.\n\nSecond paragraph.");
        assert_eq!(
            contents(&chunks),
            vec!["First paragraph here. Second paragraph."]
        );
        assert_eq!(chunks[0].chunk_type, ChunkType::Packed);
        assert_eq!(chunks[0].token_count, 5);
    }

    #[test]
    fn test_paragraph_packing() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(5), WordCounter).unwrap();
        let chunks = chunker.chunk("a b c\n\nd e\n\nf g h i");
        assert_eq!(contents(&chunks), vec!["a b c d e", "f g h i"]);
        assert!(chunks.iter().all(|c| c.chunk_type == ChunkType::Packed));
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn test_sentence_and_word_levels_keep_source_order() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(4), WordCounter).unwrap();
        let text = "intro words\n\n\
                    One two three. Four five! Six seven eight nine ten eleven twelve?\n\n\
                    tail";
        let (chunks, stats) = chunker.chunk_with_statistics(text);

        assert_eq!(
            contents(&chunks),
            vec![
                "intro words",
                "One two three",
                "Four five",
                "Six seven eight nine",
                "ten eleven twelve",
                "tail",
            ]
        );
        assert_eq!(
            chunks.iter().map(|c| c.chunk_type).collect::<Vec<_>>(),
            vec![
                ChunkType::Packed,
                ChunkType::Packed,
                ChunkType::Packed,
                ChunkType::WordSplit,
                ChunkType::WordSplit,
                ChunkType::Packed,
            ]
        );
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert!(chunk.token_count <= 4);
        }

        assert_eq!(stats.detected_paragraph_count, 3);
        assert_eq!(stats.oversized_paragraph_count, 1);
        assert_eq!(stats.oversized_sentence_count, 1);
        assert_eq!(stats.packed_chunks, 4);
        assert_eq!(stats.word_split_chunks, 2);
        assert_eq!(stats.revalidated_chunks, 0);
        assert_eq!(stats.total_chunks_created, 6);
    }

    #[test]
    fn test_packing_continues_after_oversized_paragraph() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(4), WordCounter).unwrap();
        let chunks = chunker.chunk("a b c d e. f\n\ng h");
        // "f" stays open in the running chunk and takes the next paragraph
        assert_eq!(contents(&chunks), vec!["a b c d", "e", "f g h"]);
    }

    #[test]
    fn test_irreducible_word() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(2), CharCounter).unwrap();
        let (chunks, stats) = chunker.chunk_with_statistics("tiny enormouslylongword ok");

        assert_eq!(contents(&chunks), vec!["tiny", "enormouslylongword", "ok"]);
        assert_eq!(chunks[1].token_count, 5);
        assert!(chunks[1].is_irreducible(2));
        assert!(!chunks[0].is_irreducible(2));
        assert_eq!(stats.irreducible_chunks, 1);
    }

    #[test]
    fn test_revalidation_resplits_joined_chunk() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(2), CharCounter).unwrap();
        // each paragraph is 1 token, the joined "abcd efgh" is 3
        let (chunks, stats) = chunker.chunk_with_statistics("abcd\n\nefgh");

        assert_eq!(contents(&chunks), vec!["abcd", "efgh"]);
        let types: Vec<_> = chunks.iter().map(|c| c.chunk_type).collect();
        assert_eq!(types, vec![ChunkType::Revalidated; 2]);
        assert!(chunks.iter().all(|c| c.token_count <= 2));
        assert_eq!(stats.revalidated_chunks, 2);
    }

    #[test]
    fn test_revalidation_of_word_split() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(2), CharCounter).unwrap();
        let chunks = chunker.chunk("abcd efgh");
        assert_eq!(contents(&chunks), vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_no_state_between_calls() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(3), WordCounter).unwrap();
        let text = "one two three four. five six\n\nseven";
        let (first, first_stats) = chunker.chunk_with_statistics(text);
        let (second, second_stats) = chunker.chunk_with_statistics(text);
        assert_eq!(first, second);
        assert_eq!(first_stats.counter_calls, second_stats.counter_calls);
    }

    #[test]
    fn test_count_cache_within_call() {
        let chunker = HierarchicalChunker::new(ChunkingConfig::for_budget(2), WordCounter).unwrap();
        let (_, stats) = chunker.chunk_with_statistics("same same same same");
        assert!(stats.cache_hits > 0);
    }

    #[test]
    fn test_split_text_function() {
        let counter = WordCounter;
        let chunks = split_text("a b c d e f g", 3, &counter);
        assert_eq!(contents(&chunks), vec!["a b c", "d e f", "g"]);
        assert!(split_text("", 3, &counter).is_empty());
    }

    fn words_strategy() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-zA-Z0-9 .,!?\\n]{0,400}").expect("Valid regex")
    }

    proptest! {
        #[test]
        fn proptest_chunks_respect_budget(text in words_strategy(), budget in 1usize..20) {
            let chunks = split_text(&text, budget, &CharCounter);
            for chunk in &chunks {
                prop_assert_eq!(chunk.token_count, CharCounter.count_tokens(&chunk.content));
                prop_assert!(
                    chunk.token_count <= budget || !chunk.content.contains(char::is_whitespace),
                    "chunk {:?} has {} tokens over budget {}",
                    chunk.content, chunk.token_count, budget
                );
            }
        }

        #[test]
        fn proptest_chunks_cover_normalized_words(text in words_strategy(), budget in 1usize..20) {
            let normalized = normalize(&text);
            let chunks = split_text(&normalized, budget, &CharCounter);
            let rejoined = chunks.iter().map(|c| c.content.as_str()).join(" ");
            prop_assert_eq!(
                rejoined.split_whitespace().collect::<Vec<_>>(),
                normalized.split_whitespace().collect::<Vec<_>>()
            );
            if normalized.is_empty() {
                prop_assert!(chunks.is_empty());
            }
        }
    }
}
