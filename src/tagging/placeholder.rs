use async_trait::async_trait;

use super::schema::MetadataSchema;
use super::transformer::DocumentTransformer;
use crate::document::Document;

/// Fills required schema fields with fixed placeholders instead of calling
/// a model. Keys a document already has are left alone.
pub struct PlaceholderTagger {
    schema: MetadataSchema,
}

impl PlaceholderTagger {
    pub fn new(schema: MetadataSchema) -> Self {
        Self { schema }
    }
}

#[async_trait]
impl DocumentTransformer for PlaceholderTagger {
    fn name(&self) -> &str {
        "placeholder-tagger"
    }

    async fn transform_documents(&self, documents: Vec<Document>) -> Vec<Document> {
        let placeholders = self.schema.placeholder_metadata();
        documents
            .into_iter()
            .map(|mut document| {
                for (key, value) in &placeholders {
                    document
                        .metadata
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
                document
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Metadata;
    use serde_json::json;

    #[tokio::test]
    async fn fills_missing_fields_without_clobbering() {
        let tagger = PlaceholderTagger::new(MetadataSchema::document_default());

        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), json!("Already titled"));
        let docs = vec![
            Document::with_metadata("one", metadata),
            Document::new("two"),
        ];

        let out = tagger.transform_documents(docs).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].metadata["title"], json!("Already titled"));
        assert_eq!(out[0].metadata["hasCode"], json!(false));
        assert_eq!(out[1].metadata["title"], json!("unknown"));
        assert_eq!(out[1].metadata["keywords"], json!([]));
        assert_eq!(out[1].content, "two");
    }
}
