//! Combination of per-chunk embeddings into one vector

use super::error::{EmbeddingError, Result};

/// Merges the embeddings of the chunks of one text
pub struct EmbeddingMerger;

impl EmbeddingMerger {
    /// Element-wise arithmetic mean of `embeddings`.
    ///
    /// All vectors must have the length of the first one. The mean is a heuristic
    /// stand-in for an embedding of the whole text, not an exact representation
    /// of it.
    pub fn merge_by_average(embeddings: &[Vec<f32>]) -> Result<Vec<f32>> {
        let first = embeddings.first().ok_or(EmbeddingError::NoEmbeddings)?;
        if embeddings.len() == 1 {
            return Ok(first.clone());
        }

        let embedding_dim = first.len();
        Self::check_dimensions(embeddings, embedding_dim)?;

        let mut merged = vec![0.0f32; embedding_dim];
        for embedding in embeddings {
            for (sum, &value) in merged.iter_mut().zip(embedding) {
                *sum += value;
            }
        }

        let num_embeddings = embeddings.len() as f32;
        for value in merged.iter_mut() {
            *value /= num_embeddings;
        }
        Ok(merged)
    }

    fn check_dimensions(embeddings: &[Vec<f32>], expected: usize) -> Result<()> {
        match embeddings
            .iter()
            .enumerate()
            .find(|(_, emb)| emb.len() != expected)
        {
            Some((index, emb)) => Err(EmbeddingError::DimensionMismatch {
                index,
                expected,
                actual: emb.len(),
            }),
            None => Ok(()),
        }
    }
}
