//! Core data structures for hierarchical text chunking

/// A token-bounded piece of text, ready to be sent to an embedding provider
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Chunk content: units of the source text joined by single spaces
    pub content: String,
    /// Token count of `content` as reported by the token counter
    pub token_count: usize,
    /// How this chunk was produced
    pub chunk_type: ChunkType,
    /// Index of this chunk in the output sequence
    pub chunk_index: usize,
}

impl TextChunk {
    /// Create a new chunk
    pub fn new(
        content: String,
        token_count: usize,
        chunk_type: ChunkType,
        chunk_index: usize,
    ) -> Self {
        Self {
            content,
            token_count,
            chunk_type,
            chunk_index,
        }
    }

    /// Get the length of the chunk in characters
    pub fn char_length(&self) -> usize {
        self.content.chars().count()
    }

    /// Check if this chunk is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of whitespace separated words in this chunk
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Check if this chunk fits into `budget` tokens
    pub fn fits(&self, budget: usize) -> bool {
        self.token_count <= budget
    }

    /// A single word whose own token count exceeds the budget.
    ///
    /// Word level is the bottom of the split hierarchy, so such a chunk is
    /// emitted as is.
    pub fn is_irreducible(&self, budget: usize) -> bool {
        !self.fits(budget) && self.word_count() <= 1
    }
}

impl AsRef<str> for TextChunk {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

/// Types of chunking strategies applied to create chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    /// Whole paragraphs and/or sentences greedily packed together
    Packed,
    /// Words of a sentence that alone exceeded the budget
    WordSplit,
    /// Chunk re-split at word level after joining pushed it over the budget
    Revalidated,
}

impl ChunkType {
    /// Get a human-readable description of the chunk type
    pub fn description(&self) -> &'static str {
        match self {
            ChunkType::Packed => "Packed paragraphs/sentences",
            ChunkType::WordSplit => "Word-level split",
            ChunkType::Revalidated => "Re-split after validation",
        }
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
