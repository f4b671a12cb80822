//! The unit of text that flows through ingestion and retrieval.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Metadata = Map<String, Value>;

/// A span of text plus free-form metadata (page number, source path,
/// extracted tags, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Returns a copy with `fields` merged over the existing metadata.
    /// Incoming keys replace existing ones; content is untouched.
    pub fn merged(&self, fields: Metadata) -> Self {
        let mut metadata = self.metadata.clone();
        for (key, value) in fields {
            metadata.insert(key, value);
        }
        Self {
            content: self.content.clone(),
            metadata,
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}
