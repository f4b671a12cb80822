//! LLM-backed metadata tagging.
//!
//! Each document is tagged independently: a failed extraction leaves that
//! document untouched and the batch carries on.

use async_trait::async_trait;
use serde_json::Value;

use super::parser::parse_json_object;
use super::schema::MetadataSchema;
use super::transformer::DocumentTransformer;
use crate::core::errors::RagError;
use crate::document::{Document, Metadata};
use crate::llm::TextGenerator;
use crate::prompt::PromptTemplate;

const TAGGING_TEMPLATE: &str = "\
Analyze the following document content and extract metadata according to the schema.

Schema: {schema}

Document content:
{content}

Provide the metadata as a JSON object matching the schema. Only include the properties defined in the schema.
";

/// A document whose tagging failed and was passed through unchanged.
#[derive(Debug, Clone)]
pub struct TagFailure {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct TaggingReport {
    pub documents: Vec<Document>,
    pub failures: Vec<TagFailure>,
}

impl TaggingReport {
    pub fn tagged_count(&self) -> usize {
        self.documents.len() - self.failures.len()
    }
}

pub struct MetadataTagger<G> {
    schema: MetadataSchema,
    schema_text: String,
    validator: jsonschema::Validator,
    template: PromptTemplate,
    generator: G,
}

impl<G: TextGenerator> MetadataTagger<G> {
    pub fn new(schema: MetadataSchema, generator: G) -> Result<Self, RagError> {
        let schema_json = schema.to_json();
        let validator = jsonschema::validator_for(&schema_json)
            .map_err(|err| RagError::Config(format!("invalid metadata schema: {}", err)))?;
        let schema_text = serde_json::to_string(&schema_json).map_err(RagError::internal)?;
        let template = PromptTemplate::new(TAGGING_TEMPLATE)?;
        Ok(Self {
            schema,
            schema_text,
            validator,
            template,
            generator,
        })
    }

    pub fn schema(&self) -> &MetadataSchema {
        &self.schema
    }

    pub fn render_request(&self, content: &str) -> Result<String, RagError> {
        self.template
            .render(&[("schema", &self.schema_text), ("content", content)])
    }

    /// Runs one extraction: prompt, generate, parse, check against the schema.
    pub async fn extract(&self, document: &Document) -> Result<Metadata, RagError> {
        let request = self.render_request(&document.content)?;
        let response = self.generator.generate(&request).await?;
        let parsed = parse_json_object(&response)?;
        let extracted = self.schema.retain_declared(parsed);
        self.check(&extracted)?;
        Ok(extracted)
    }

    fn check(&self, extracted: &Metadata) -> Result<(), RagError> {
        let instance = Value::Object(extracted.clone());
        let problems: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|err| err.to_string())
            .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(RagError::Parse(format!(
                "metadata does not match schema: {}",
                problems.join("; ")
            )))
        }
    }

    /// Tags every document in order. Output has the same length and order as
    /// the input; failed positions hold the original document.
    pub async fn tag_documents(&self, documents: Vec<Document>) -> TaggingReport {
        let mut tagged = Vec::with_capacity(documents.len());
        let mut failures = Vec::new();

        for (index, document) in documents.into_iter().enumerate() {
            match self.extract(&document).await {
                Ok(fields) => tagged.push(document.merged(fields)),
                Err(err) => {
                    tracing::warn!(
                        document = index,
                        generator = self.generator.name(),
                        "Error tagging document: {}",
                        err
                    );
                    failures.push(TagFailure {
                        index,
                        reason: err.to_string(),
                    });
                    tagged.push(document);
                }
            }
        }

        tracing::info!(
            "Tagged {} of {} documents",
            tagged.len() - failures.len(),
            tagged.len()
        );
        TaggingReport {
            documents: tagged,
            failures,
        }
    }
}

#[async_trait]
impl<G: TextGenerator> DocumentTransformer for MetadataTagger<G> {
    fn name(&self) -> &str {
        "llm-metadata-tagger"
    }

    async fn transform_documents(&self, documents: Vec<Document>) -> Vec<Document> {
        self.tag_documents(documents).await.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<Result<String, RagError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, RagError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, RagError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(RagError::Generation("script exhausted".to_string())))
        }
    }

    fn page(content: &str, number: u64) -> Document {
        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), json!(number));
        Document::with_metadata(content, metadata)
    }

    #[test]
    fn request_embeds_schema_and_content() {
        let tagger =
            MetadataTagger::new(MetadataSchema::document_default(), Scripted::new(vec![])).unwrap();
        let request = tagger.render_request("def foo(): pass").unwrap();

        assert!(request.contains("\"hasCode\":{\"type\":\"boolean\"}"));
        assert!(request.contains("Document content:\ndef foo(): pass"));
        assert!(request.contains("Only include the properties defined in the schema."));
    }

    #[tokio::test]
    async fn success_merges_declared_fields_only() {
        let generator = Scripted::new(vec![Ok(
            r#"{"title": "Snippet", "keywords": ["code"], "hasCode": true, "mood": "happy"}"#
                .to_string(),
        )]);
        let tagger = MetadataTagger::new(MetadataSchema::document_default(), generator).unwrap();

        let report = tagger.tag_documents(vec![page("def foo(): pass", 1)]).await;
        assert!(report.failures.is_empty());

        let doc = &report.documents[0];
        assert_eq!(doc.content, "def foo(): pass");
        assert_eq!(doc.metadata["page"], json!(1));
        assert_eq!(doc.metadata["title"], json!("Snippet"));
        assert_eq!(doc.metadata["keywords"], json!(["code"]));
        assert_eq!(doc.metadata["hasCode"], json!(true));
        assert!(!doc.metadata.contains_key("mood"));
    }

    #[tokio::test]
    async fn missing_required_field_keeps_original() {
        let generator = Scripted::new(vec![Ok(r#"{"title": "No keywords"}"#.to_string())]);
        let tagger = MetadataTagger::new(MetadataSchema::document_default(), generator).unwrap();

        let original = page("text", 3);
        let report = tagger.tag_documents(vec![original.clone()]).await;

        assert_eq!(report.documents, vec![original]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("does not match schema"));
    }

    #[tokio::test]
    async fn wrong_type_keeps_original() {
        let generator = Scripted::new(vec![Ok(
            r#"{"title": "T", "keywords": "code", "hasCode": "yes"}"#.to_string(),
        )]);
        let tagger = MetadataTagger::new(MetadataSchema::document_default(), generator).unwrap();

        let original = page("text", 1);
        let report = tagger.tag_documents(vec![original.clone()]).await;
        assert_eq!(report.documents[0], original);
        assert_eq!(report.tagged_count(), 0);
    }

    #[tokio::test]
    async fn retagging_overwrites_instead_of_accumulating() {
        let reply = r#"{"title": "Snippet", "keywords": ["code"], "hasCode": true}"#;
        let generator = Scripted::new(vec![Ok(reply.to_string()), Ok(reply.to_string())]);
        let tagger = MetadataTagger::new(MetadataSchema::document_default(), generator).unwrap();

        let once = tagger.tag_documents(vec![page("x", 1)]).await.documents;
        let twice = tagger.tag_documents(once.clone()).await.documents;

        assert_eq!(once, twice);
        assert_eq!(twice[0].metadata.len(), 4);
    }

    #[tokio::test]
    async fn every_document_is_prompted_even_after_failures() {
        let generator = Scripted::new(vec![
            Err(RagError::Generation("boom".to_string())),
            Ok("not json at all".to_string()),
            Ok(r#"{"title": "ok", "keywords": [], "hasCode": false}"#.to_string()),
        ]);
        let tagger = MetadataTagger::new(MetadataSchema::document_default(), generator).unwrap();

        let report = tagger
            .tag_documents(vec![page("a", 1), page("b", 2), page("c", 3)])
            .await;

        assert_eq!(tagger.generator.prompts.lock().unwrap().len(), 3);
        let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![0, 1]);
        assert_eq!(report.documents[2].metadata["title"], json!("ok"));
    }
}
