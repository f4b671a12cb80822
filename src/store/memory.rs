use async_trait::async_trait;
use tokio::sync::RwLock;

use super::similarity::rank_descending_by_cosine;
use super::{SearchHit, StoredRecord, VectorStore};
use crate::core::errors::RagError;

/// In-process store with brute-force cosine search.
#[derive(Default)]
pub struct MemoryVectorStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<StoredRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert_batch(&self, records: Vec<StoredRecord>) -> Result<usize, RagError> {
        let inserted = records.len();
        self.records.write().await.extend(records);
        Ok(inserted)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, RagError> {
        let records = self.records.read().await;
        let embeddings: Vec<Vec<f32>> = records.iter().map(|r| r.embedding.clone()).collect();
        let ranked = rank_descending_by_cosine(query_embedding, &embeddings)?;

        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(idx, score)| SearchHit {
                document: records[idx].to_document(),
                score,
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, RagError> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn clear(&self) -> Result<u64, RagError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn sample(&self) -> Result<Option<StoredRecord>, RagError> {
        Ok(self.records.read().await.first().cloned())
    }
}
