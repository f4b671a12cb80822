//! Ingestion: PDF pages -> tagged documents -> chunks -> embeddings -> store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::chunker::{RecursiveTextSplitter, SplitterConfig};
use crate::core::config::{IngestConfig, TaggingMode};
use crate::core::errors::RagError;
use crate::document::Document;
use crate::embed::Embedder;
use crate::llm::{TextGenerator, Unavailable};
use crate::loader::{drop_short_pages, PdfLoader};
use crate::store::{StoredRecord, VectorStore};
use crate::tagging::{DocumentTransformer, MetadataSchema, MetadataTagger, PlaceholderTagger};

/// Builds the tagging stage for `mode`. In `llm` mode without a generator
/// every document fails tagging and passes through untouched.
pub fn build_transformer(
    mode: TaggingMode,
    schema: MetadataSchema,
    generator: Option<Arc<dyn TextGenerator>>,
) -> Result<Option<Arc<dyn DocumentTransformer>>, RagError> {
    let transformer: Arc<dyn DocumentTransformer> = match mode {
        TaggingMode::Off => return Ok(None),
        TaggingMode::Placeholder => Arc::new(PlaceholderTagger::new(schema)),
        TaggingMode::Llm => match generator {
            Some(generator) => Arc::new(MetadataTagger::new(schema, generator)?),
            None => {
                tracing::warn!("Tagging mode is llm but no generation provider is configured");
                Arc::new(MetadataTagger::new(schema, Unavailable)?)
            }
        },
    };
    Ok(Some(transformer))
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub pages_loaded: usize,
    pub pages_kept: usize,
    pub chunks: usize,
    pub deleted: u64,
    pub inserted: usize,
    /// `count_documents` after the insert
    pub stored: u64,
}

pub struct IngestionPipeline<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    transformer: Option<&'a dyn DocumentTransformer>,
    splitter: RecursiveTextSplitter,
    min_words_per_page: usize,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        config: &IngestConfig,
    ) -> Result<Self, RagError> {
        let splitter = RecursiveTextSplitter::new(SplitterConfig {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        })?;
        Ok(Self {
            embedder,
            store,
            transformer: None,
            splitter,
            min_words_per_page: config.min_words_per_page,
        })
    }

    pub fn with_transformer(mut self, transformer: &'a dyn DocumentTransformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    pub async fn ingest_pdf(&self, loader: &PdfLoader) -> Result<IngestReport, RagError> {
        let pages = loader.load().await?;
        self.ingest_pages(pages).await
    }

    /// Runs every stage after loading. The collection is cleared only once
    /// all embeddings are ready, so a failed run leaves the previous
    /// generation in place.
    pub async fn ingest_pages(&self, pages: Vec<Document>) -> Result<IngestReport, RagError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let pages_loaded = pages.len();

        let pages = drop_short_pages(pages, self.min_words_per_page);
        let pages_kept = pages.len();

        let documents = match self.transformer {
            Some(transformer) => {
                tracing::info!("Creating metadata for the documents with {}", transformer.name());
                transformer.transform_documents(pages).await
            }
            None => pages,
        };

        tracing::info!("Splitting the documents into chunks");
        let chunks = self.splitter.split_documents(&documents);
        let chunks = stamp_provenance(chunks, run_id, started_at);

        tracing::info!("Generating embeddings for {} chunks", chunks.len());
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let records: Vec<StoredRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredRecord::new(chunk, embedding))
            .collect();
        let chunk_count = records.len();

        tracing::info!("Deleting the collection before adding new data");
        let deleted = self.store.clear().await?;

        tracing::info!("Storing the vectors in {}", self.store.name());
        let inserted = self.store.insert_batch(records).await?;
        let stored = self.store.count().await?;

        Ok(IngestReport {
            run_id,
            started_at,
            pages_loaded,
            pages_kept,
            chunks: chunk_count,
            deleted,
            inserted,
            stored,
        })
    }
}

/// Adds `chunk_index`, `content_hash`, `ingest_run` and `ingested_at`.
pub fn stamp_provenance(
    chunks: Vec<Document>,
    run_id: Uuid,
    ingested_at: DateTime<Utc>,
) -> Vec<Document> {
    let run = run_id.to_string();
    let timestamp = ingested_at.to_rfc3339();
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, mut chunk)| {
            let hash = content_hash(&chunk.content);
            chunk.metadata.insert("chunk_index".to_string(), json!(index));
            chunk.metadata.insert("content_hash".to_string(), json!(hash));
            chunk.metadata.insert("ingest_run".to_string(), json!(run));
            chunk.metadata.insert("ingested_at".to_string(), json!(timestamp));
            chunk
        })
        .collect()
}

pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
