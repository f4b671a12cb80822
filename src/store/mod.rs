//! Vector storage.
//!
//! `VectorStore` abstracts the backing database. `AtlasVectorStore` talks to
//! MongoDB Atlas `$vectorSearch`; `MemoryVectorStore` does brute-force cosine
//! search in process and backs the tests.

mod atlas;
mod memory;
mod similarity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use atlas::AtlasVectorStore;
pub use memory::MemoryVectorStore;
pub use similarity::{cosine_similarity, rank_descending_by_cosine};

use crate::core::errors::RagError;
use crate::document::{Document, Metadata};

/// One persisted chunk: `{text, metadata, embedding}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

impl StoredRecord {
    pub fn new(document: Document, embedding: Vec<f32>) -> Self {
        Self {
            text: document.content,
            metadata: document.metadata,
            embedding,
        }
    }

    pub fn to_document(&self) -> Document {
        Document::with_metadata(self.text.clone(), self.metadata.clone())
    }
}

/// Result of a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub document: Document,
    /// Similarity score (higher = better).
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &str;

    /// Inserts records in one batch and returns how many were written.
    async fn insert_batch(&self, records: Vec<StoredRecord>) -> Result<usize, RagError>;

    /// Returns up to `limit` records ordered by descending similarity.
    async fn search(&self, query_embedding: &[f32], limit: usize)
        -> Result<Vec<SearchHit>, RagError>;

    async fn count(&self) -> Result<u64, RagError>;

    /// Removes every record and returns how many were deleted.
    async fn clear(&self) -> Result<u64, RagError>;

    /// Any one stored record, for diagnostics.
    async fn sample(&self) -> Result<Option<StoredRecord>, RagError>;
}

/// Atlas Vector Search index definition for the `embedding` field.
pub fn index_definition(dimensions: usize) -> Value {
    json!({
        "fields": [
            {
                "type": "vector",
                "path": "embedding",
                "numDimensions": dimensions,
                "similarity": "cosine",
            }
        ]
    })
}
