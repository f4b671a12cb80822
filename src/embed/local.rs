use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{check_embeddings, Embedder};
use crate::core::config::EmbeddingConfig;
use crate::core::errors::RagError;

/// Local ONNX sentence embeddings. Model load and inference are CPU bound
/// and run on the blocking pool.
pub struct FastEmbedder {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

impl FastEmbedder {
    pub async fn new(config: &EmbeddingConfig) -> Result<Self, RagError> {
        let model_kind = resolve_model(&config.model)?;
        let cache_dir = config.cache_dir.clone().map(PathBuf::from);

        tracing::info!("Loading embedding model {}", config.model);
        let model = tokio::task::spawn_blocking(move || {
            let mut options = InitOptions::default();
            options.model_name = model_kind;
            options.show_download_progress = false;
            if let Some(dir) = cache_dir {
                options.cache_dir = dir;
            }
            TextEmbedding::try_new(options)
        })
        .await
        .map_err(RagError::internal)?
        .map_err(|err| RagError::Embedding(format!("failed to load {}: {}", config.model, err)))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();
        let model = Arc::clone(&self.model);
        let vectors = tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(RagError::internal)?
            .map_err(|err| RagError::Embedding(err.to_string()))?;

        check_embeddings(&vectors, expected, self.dimensions)?;
        tracing::debug!("Embedded {} texts with {}", expected, self.model_name);
        Ok(vectors)
    }
}

/// Maps a configured model name onto a bundled fastembed model.
fn resolve_model(name: &str) -> Result<EmbeddingModel, RagError> {
    let short = name.rsplit('/').next().unwrap_or(name).to_ascii_lowercase();
    match short.as_str() {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        _ => Err(RagError::Config(format!(
            "unsupported embedding model '{}'",
            name
        ))),
    }
}
