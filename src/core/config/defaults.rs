use serde_json::{json, Value};

pub const DEFAULT_DATABASE: &str = "RAG-demo";
pub const DEFAULT_COLLECTION: &str = "chunked_data";
pub const DEFAULT_INDEX: &str = "vector_index";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_DIMENSIONS: u64 = 384;

pub fn generate_default_config() -> Value {
    json!({
        "database": {
            "name": DEFAULT_DATABASE,
            "collection": DEFAULT_COLLECTION,
            "index": DEFAULT_INDEX,
        },
        "embedding": {
            "model": DEFAULT_EMBEDDING_MODEL,
            "dimensions": DEFAULT_DIMENSIONS,
        },
        "ingest": {
            "source_pdf": "./cv/cv.pdf",
            "min_words_per_page": 20,
            "chunk_size": 500,
            "chunk_overlap": 150,
            "tagging": "llm",
        },
        "retrieval": {
            "top_k": 3,
            "num_candidates": 30,
            "subject_domain": "MongoDB",
        },
        "generation": {
            "provider": "gemini",
            "model": "gemini-2.5-flash",
            "temperature": 0.0,
            "max_tokens": 512,
        },
        "logging": {
            "level": "info",
            "file": false,
        },
    })
}
