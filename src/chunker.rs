//! Recursive character splitting.
//!
//! Text is cut on the coarsest separator that occurs (paragraph, line,
//! word, character), pieces are packed back together up to `chunk_size`
//! characters, and consecutive chunks share up to `chunk_overlap` characters.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;
use crate::document::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 150,
        }
    }
}

pub struct RecursiveTextSplitter {
    config: SplitterConfig,
    separators: Vec<String>,
}

impl RecursiveTextSplitter {
    pub fn new(config: SplitterConfig) -> Result<Self, RagError> {
        if config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be positive".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self {
            config,
            separators: ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Splits each document; children inherit the parent's metadata.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut chunks = Vec::new();
        for document in documents {
            for text in self.split_text(&document.content) {
                chunks.push(Document::with_metadata(text, document.metadata.clone()));
            }
        }
        chunks
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).map(String::as_str).unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let splits: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for split in splits {
            if char_len(split) < self.config.chunk_size {
                pending.push(split);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge_splits(&pending, separator));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(split.to_string());
            } else {
                chunks.extend(self.split_recursive(split, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_splits(&pending, separator));
        }
        chunks
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut merged = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &split in splits {
            let len = char_len(split);
            let joiner = if current.is_empty() { 0 } else { sep_len };
            if total + len + joiner > size && !current.is_empty() {
                if let Some(chunk) = join_trimmed(&current, separator) {
                    merged.push(chunk);
                }
                // shed from the front until what's left fits as overlap
                while total > overlap
                    || (total > 0
                        && total + len + if current.is_empty() { 0 } else { sep_len } > size)
                {
                    let Some(first) = current.pop_front() else {
                        break;
                    };
                    let joined = if current.is_empty() { 0 } else { sep_len };
                    total = total.saturating_sub(char_len(first) + joined);
                }
            }
            current.push_back(split);
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }

        if let Some(chunk) = join_trimmed(&current, separator) {
            merged.push(chunk);
        }
        merged
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn join_trimmed(parts: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = parts.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> RecursiveTextSplitter {
        RecursiveTextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
        })
        .unwrap()
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = splitter(500, 150).split_text("A short paragraph.");
        assert_eq!(chunks, vec!["A short paragraph.".to_string()]);
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let text = "This is a test. ".repeat(40);
        let chunks = splitter(100, 20).split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.len());
        }
        // neighbouring chunks share their boundary words
        let tail: Vec<&str> = chunks[0].split(' ').rev().take(2).collect();
        for word in tail {
            assert!(chunks[1].contains(word));
        }
    }

    #[test]
    fn paragraphs_are_preferred_split_points() {
        let text = format!("{}\n\n{}", "a".repeat(30), "b".repeat(30));
        let chunks = splitter(40, 0).split_text(&text);
        assert_eq!(chunks, vec!["a".repeat(30), "b".repeat(30)]);
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let text = "x".repeat(25);
        let chunks = splitter(10, 2).split_text(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks[0], "x".repeat(10));
        assert!(chunks.len() >= 3);
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "日本語".repeat(10);
        let chunks = splitter(7, 1).split_text(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
    }

    #[test]
    fn children_inherit_metadata() {
        let mut doc = Document::new(format!("{}\n\n{}", "a".repeat(30), "b".repeat(30)));
        doc.metadata.insert("page".to_string(), json!(4));

        let chunks = splitter(40, 0).split_documents(&[doc]);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.metadata["page"] == json!(4)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(RecursiveTextSplitter::new(SplitterConfig {
            chunk_size: 10,
            chunk_overlap: 10
        })
        .is_err());
        assert!(RecursiveTextSplitter::new(SplitterConfig {
            chunk_size: 0,
            chunk_overlap: 0
        })
        .is_err());
    }
}
