use thiserror::Error;

use crate::core::errors::RagError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] RagError),

    #[error("Failed to connect to the vector store: {0}")]
    Store(#[source] RagError),

    #[error("Failed to load the embedding model: {0}")]
    Embedder(#[source] RagError),

    #[error("Failed to initialize text generation: {0}")]
    Generator(#[source] RagError),
}
