//! Error types for hierarchical text chunking

/// Error types for chunking setup
///
/// Splitting itself never fails; only an invalid configuration is rejected.
#[derive(thiserror::Error, Debug)]
pub enum ChunkingError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for chunking operations
pub type Result<T> = std::result::Result<T, ChunkingError>;

impl ChunkingError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ChunkingError::configuration("max_chunk_tokens must be greater than 0");
        assert!(matches!(error, ChunkingError::Configuration(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: max_chunk_tokens must be greater than 0"
        );
    }
}
