pub mod chunking;
pub mod normalize;
pub mod tokenizer;

pub use normalize::normalize;
pub use tokenizer::TiktokenCounter;

use once_cell::sync::Lazy;
use regex::Regex;

static DEFAULT_SENTENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("static sentence pattern"));

/// Splits text into the units of the chunking hierarchy: paragraphs, sentences and words.
///
/// Every unit is trimmed and empty units are skipped. Sentence terminators are
/// treated as one delimiter class, so runs like `"?!"` or `"..."` count as a
/// single boundary, and the terminators themselves are dropped.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    paragraph_delimiter: &'static str,
    sentence_regex: Regex,
}

impl SentenceSplitter {
    // blank line
    pub const PARAGRAPH_DELIMITER: &'static str = "\n\n";

    pub fn paragraphs<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.split(self.paragraph_delimiter)
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn sentences<'a>(&'a self, paragraph: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.sentence_regex
            .split(paragraph)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn words(text: &str) -> impl Iterator<Item = &str> {
        text.split_whitespace()
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self {
            paragraph_delimiter: Self::PARAGRAPH_DELIMITER,
            sentence_regex: DEFAULT_SENTENCE_REGEX.clone(),
        }
    }
}
