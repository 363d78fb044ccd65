//! Token counter backed by the OpenAI BPE tables

use crate::text::chunking::TokenCounter;
use anyhow::{Context, Result};
use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Counts tokens with the BPE encoding of an OpenAI model
pub struct TiktokenCounter {
    bpe: CoreBPE,
    encoding_model: String,
}

impl TiktokenCounter {
    /// Resolve the encoding used by `model`.
    ///
    /// Unknown model names fall back to `cl100k_base`, the encoding of the
    /// `text-embedding-3-*` and `text-embedding-ada-002` models.
    pub fn for_model(model: &str) -> Result<Self> {
        match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => Ok(Self {
                bpe,
                encoding_model: model.to_string(),
            }),
            Err(e) => {
                warn!(
                    "no tokenizer registered for model {}, using cl100k_base: {:?}",
                    model, e
                );
                Self::cl100k_base()
            }
        }
    }

    pub fn cl100k_base() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().context("load cl100k_base tokenizer")?;
        Ok(Self {
            bpe,
            encoding_model: "cl100k_base".to_string(),
        })
    }

    /// Model (or encoding) name this counter was resolved from
    pub fn encoding_model(&self) -> &str {
        &self.encoding_model
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("encoding_model", &self.encoding_model)
            .finish()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        // special-token markup is counted as plain text
        self.bpe.encode_ordinary(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_for_embedding_model() {
        let counter = TiktokenCounter::for_model("text-embedding-3-small").unwrap();
        assert_eq!(counter.count_tokens(""), 0);
        assert_eq!(counter.count_tokens("hello world"), 2);
        let longer = counter.count_tokens("tokenization of a longer sentence");
        assert!(longer > 3);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let counter = TiktokenCounter::for_model("no-such-model").unwrap();
        assert_eq!(counter.encoding_model(), "cl100k_base");
        assert_eq!(counter.count_tokens("hello world"), 2);
    }

    #[test]
    fn test_special_tokens_counted_as_text() {
        let counter = TiktokenCounter::cl100k_base().unwrap();
        assert!(counter.count_tokens("<|endoftext|>") > 1);
    }
}
