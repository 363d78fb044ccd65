//! Embedding provider abstraction

/// Failure of a single embedding request
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Provider error: {0}")]
    Other(String),
}

impl ProviderError {
    /// Create an error from a non-success provider status
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response<S: Into<String>>(msg: S) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a generic provider error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Api { .. } => "api",
            Self::InvalidResponse(_) => "invalid_response",
            Self::MissingCredential(_) => "missing_credential",
            Self::Other(_) => "other",
        }
    }
}

/// Produces one embedding vector for a bounded piece of text
///
/// Implementations perform a single blocking request. Retry, if wanted,
/// belongs inside the implementation; callers propagate any error as is.
pub trait EmbeddingProvider: Send + Sync {
    fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>, ProviderError>;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>, ProviderError> {
        (**self).create_embedding(text, model)
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>, ProviderError> {
        (**self).create_embedding(text, model)
    }
}
