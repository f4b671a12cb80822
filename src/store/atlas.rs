use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, Document as BsonDocument};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::Deserialize;

use super::{SearchHit, StoredRecord, VectorStore};
use crate::core::config::DatabaseConfig;
use crate::core::errors::RagError;
use crate::document::{Document, Metadata};

/// Candidates scanned per returned neighbour when the caller gives no
/// explicit `num_candidates`.
const CANDIDATE_MULTIPLIER: usize = 10;

/// MongoDB Atlas collection with a vector search index on `embedding`.
///
/// The index itself is provisioned by an operator; see
/// [`super::index_definition`].
pub struct AtlasVectorStore {
    client: Client,
    collection: Collection<StoredRecord>,
    index_name: String,
    namespace: String,
    num_candidates: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ScoredRecord {
    text: String,
    #[serde(default)]
    metadata: Metadata,
    score: f64,
}

impl AtlasVectorStore {
    pub async fn connect(connection_string: &str, config: &DatabaseConfig) -> Result<Self, RagError> {
        let mut options = ClientOptions::parse(connection_string)
            .await
            .map_err(|err| RagError::Config(format!("invalid connection string: {}", err)))?;
        options.app_name = Some("pdfrag".to_string());

        let client = Client::with_options(options).map_err(RagError::store)?;
        let collection = client
            .database(&config.name)
            .collection::<StoredRecord>(&config.collection);

        tracing::info!("Connected to {}", config.namespace());
        Ok(Self {
            client,
            collection,
            index_name: config.index.clone(),
            namespace: config.namespace(),
            num_candidates: None,
        })
    }

    /// Overrides the number of ANN candidates scanned per query.
    pub fn with_num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = Some(num_candidates);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Closes the connection pool. Call once at the end of each entry point.
    pub async fn close(self) {
        self.client.shutdown().await;
        tracing::debug!("Closed connection to {}", self.namespace);
    }

    fn search_pipeline(&self, query_embedding: &[f32], limit: usize) -> Vec<BsonDocument> {
        let num_candidates = self
            .num_candidates
            .unwrap_or(limit * CANDIDATE_MULTIPLIER)
            .max(limit);
        let query_vector: Vec<f64> = query_embedding.iter().map(|v| f64::from(*v)).collect();
        vec![
            doc! {
                "$vectorSearch": {
                    "index": self.index_name.as_str(),
                    "path": "embedding",
                    "queryVector": query_vector,
                    "numCandidates": num_candidates as i64,
                    "limit": limit as i64,
                }
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "text": 1,
                    "metadata": 1,
                    "score": { "$meta": "vectorSearchScore" },
                }
            },
        ]
    }
}

#[async_trait]
impl VectorStore for AtlasVectorStore {
    fn name(&self) -> &str {
        "mongodb-atlas"
    }

    async fn insert_batch(&self, records: Vec<StoredRecord>) -> Result<usize, RagError> {
        if records.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection
            .insert_many(records, None)
            .await
            .map_err(RagError::store)?;
        Ok(result.inserted_ids.len())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, RagError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let pipeline = self.search_pipeline(query_embedding, limit);
        let mut cursor = self
            .collection
            .aggregate(pipeline, None)
            .await
            .map_err(RagError::store)?;

        let mut hits = Vec::new();
        while let Some(raw) = cursor.try_next().await.map_err(RagError::store)? {
            let scored: ScoredRecord = bson::from_document(raw).map_err(RagError::store)?;
            hits.push(SearchHit {
                document: Document::with_metadata(scored.text, scored.metadata),
                score: scored.score as f32,
            });
        }
        tracing::debug!("Vector search on {} returned {} hits", self.namespace, hits.len());
        Ok(hits)
    }

    async fn count(&self) -> Result<u64, RagError> {
        self.collection
            .count_documents(doc! {}, None)
            .await
            .map_err(RagError::store)
    }

    async fn clear(&self) -> Result<u64, RagError> {
        let result = self
            .collection
            .delete_many(doc! {}, None)
            .await
            .map_err(RagError::store)?;
        Ok(result.deleted_count)
    }

    async fn sample(&self) -> Result<Option<StoredRecord>, RagError> {
        self.collection
            .find_one(doc! {}, None)
            .await
            .map_err(RagError::store)
    }
}
