pub mod chunker;
pub mod core;
pub mod diagnostics;
pub mod document;
pub mod embed;
pub mod ingest;
pub mod llm;
pub mod loader;
pub mod prompt;
pub mod retrieval;
pub mod state;
pub mod store;
pub mod tagging;
