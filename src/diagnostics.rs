//! Collection health check and vector index setup instructions.

use std::fmt::Write as _;

use serde_json::json;

use crate::core::config::DatabaseConfig;
use crate::core::errors::RagError;
use crate::store::{index_definition, SearchHit, StoredRecord, VectorStore};

#[derive(Debug, Clone)]
pub struct CollectionStatus {
    pub count: u64,
    pub sample: Option<StoredRecord>,
}

pub async fn inspect(store: &dyn VectorStore) -> Result<CollectionStatus, RagError> {
    let count = store.count().await?;
    let sample = if count > 0 { store.sample().await? } else { None };
    Ok(CollectionStatus { count, sample })
}

/// Sample record without the raw vector, which is only reported by length.
pub fn describe_sample(record: &StoredRecord) -> String {
    let summary = json!({
        "text": record.text,
        "metadata": record.metadata,
        "embedding": format!("[{} floats]", record.embedding.len()),
    });
    serde_json::to_string_pretty(&summary).unwrap_or_else(|_| record.text.clone())
}

/// One retrieved chunk as printed by the query entry points: content cut to
/// `preview_chars` characters, then its metadata.
pub fn format_hit(position: usize, hit: &SearchHit, preview_chars: usize) -> String {
    let preview: String = hit.document.content.chars().take(preview_chars).collect();
    let metadata = serde_json::to_string(&hit.document.metadata).unwrap_or_default();
    format!(
        "\nDocument {} (score {:.4}):\nContent: {}...\nMetadata: {}\n{}",
        position,
        hit.score,
        preview,
        metadata,
        "-".repeat(80)
    )
}

/// Step-by-step Atlas UI instructions for creating the search index.
pub fn index_instructions(database: &DatabaseConfig, dimensions: usize) -> String {
    let definition = serde_json::to_string_pretty(&index_definition(dimensions))
        .unwrap_or_default();

    let mut out = String::new();
    let rule = "=".repeat(80);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "IMPORTANT: You need to create a Vector Search Index in MongoDB Atlas!");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "\nSteps to create the index:");
    let _ = writeln!(out, "1. Go to your MongoDB Atlas dashboard");
    let _ = writeln!(out, "2. Navigate to your cluster");
    let _ = writeln!(out, "3. Click on 'Search' tab");
    let _ = writeln!(out, "4. Click 'Create Search Index'");
    let _ = writeln!(out, "5. Choose 'JSON Editor'");
    let _ = writeln!(out, "6. Use this configuration:\n");
    let _ = writeln!(out, "{}", definition);
    let _ = writeln!(out, "\n7. Set the index name to: {}", database.index);
    let _ = writeln!(out, "8. Set the database to: {}", database.name);
    let _ = writeln!(out, "9. Set the collection to: {}", database.collection);
    let _ = writeln!(out, "10. Click 'Create Search Index'");
    let _ = write!(
        out,
        "\nAfter creating the index, wait a few minutes for it to build, then run retrieve_simple again."
    );
    out
}
