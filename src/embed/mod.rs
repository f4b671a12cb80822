//! Text embedding.

mod local;

use std::sync::Arc;

use async_trait::async_trait;

pub use local::FastEmbedder;

use crate::core::errors::RagError;

/// Maps text to fixed-length vectors. Query and passage embeddings come
/// from the same model so they can be compared with cosine similarity.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RagError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_documents(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("no embedding returned for query".to_string()))
    }
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RagError> {
        (**self).embed_documents(texts).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        (**self).embed_query(text).await
    }
}

/// Rejects output whose count or width does not match what was asked for.
pub fn check_embeddings(
    vectors: &[Vec<f32>],
    expected_count: usize,
    dimensions: usize,
) -> Result<(), RagError> {
    if vectors.len() != expected_count {
        return Err(RagError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected_count,
            vectors.len()
        )));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
        return Err(RagError::Embedding(format!(
            "embedding has {} dimensions, index expects {}",
            bad.len(),
            dimensions
        )));
    }
    Ok(())
}
