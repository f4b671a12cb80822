use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,
    pub collection: String,
    pub index: String,
}

impl DatabaseConfig {
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.name, self.collection)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimensions: usize,
    #[serde(default)]
    pub cache_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggingMode {
    Llm,
    Placeholder,
    Off,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub source_pdf: String,
    pub min_words_per_page: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub tagging: TaggingMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub num_candidates: usize,
    pub subject_domain: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    Huggingface,
    Lmstudio,
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: bool,
}
