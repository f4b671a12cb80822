use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("unparsable model output: {0}")]
    Parse(String),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("vector store error: {0}")]
    Store(String),
    #[error("pdf error: {0}")]
    Pdf(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RagError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        RagError::Internal(err.to_string())
    }

    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        RagError::Store(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        RagError::Generation(err.to_string())
    }

    /// True for failures that come from bad or missing configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, RagError::Config(_))
    }
}
