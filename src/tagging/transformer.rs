use std::sync::Arc;

use async_trait::async_trait;

use crate::document::Document;

/// A `Vec<Document> -> Vec<Document>` stage of the ingestion pipeline.
/// Implementations must keep length and order and never fail the batch.
#[async_trait]
pub trait DocumentTransformer: Send + Sync {
    fn name(&self) -> &str;

    async fn transform_documents(&self, documents: Vec<Document>) -> Vec<Document>;
}

#[async_trait]
impl<T: DocumentTransformer + ?Sized> DocumentTransformer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn transform_documents(&self, documents: Vec<Document>) -> Vec<Document> {
        (**self).transform_documents(documents).await
    }
}
