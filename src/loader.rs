//! PDF loading: one `Document` per page.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::core::errors::RagError;
use crate::document::{Document, Metadata};

pub struct PdfLoader {
    path: PathBuf,
}

impl PdfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extracts text page by page. Each document carries `source` and a
    /// zero-based `page` in its metadata.
    pub async fn load(&self) -> Result<Vec<Document>, RagError> {
        if !self.path.exists() {
            return Err(RagError::Pdf(format!(
                "{} does not exist",
                self.path.display()
            )));
        }

        let path = self.path.clone();
        let pages = tokio::task::spawn_blocking(move || extract_pages(&path))
            .await
            .map_err(RagError::internal)??;

        let source = self.path.to_string_lossy().to_string();
        tracing::info!("Loaded {} pages from {}", pages.len(), source);
        Ok(pages_to_documents(&source, pages))
    }
}

fn extract_pages(path: &Path) -> Result<Vec<String>, RagError> {
    // pdf-extract panics on some malformed fonts instead of returning an error
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(path)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(err)) => Err(RagError::Pdf(format!(
            "failed to extract text from {}: {}",
            path.display(),
            err
        ))),
        Err(_) => Err(RagError::Pdf(format!(
            "text extraction panicked for {}",
            path.display()
        ))),
    }
}

pub fn pages_to_documents(source: &str, pages: Vec<String>) -> Vec<Document> {
    pages
        .into_iter()
        .enumerate()
        .map(|(page, text)| {
            let mut metadata = Metadata::new();
            metadata.insert("source".to_string(), json!(source));
            metadata.insert("page".to_string(), json!(page));
            Document::with_metadata(text, metadata)
        })
        .collect()
}

/// Drops near-empty pages (cover sheets, separators) that carry no
/// retrievable text. Keeps pages with more than `min_words` words.
pub fn drop_short_pages(documents: Vec<Document>, min_words: usize) -> Vec<Document> {
    let before = documents.len();
    let kept: Vec<Document> = documents
        .into_iter()
        .filter(|doc| doc.word_count() > min_words)
        .collect();
    if kept.len() < before {
        tracing::debug!("Dropped {} short pages", before - kept.len());
    }
    kept
}
