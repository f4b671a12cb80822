use crate::core::config::RetrievalConfig;
use crate::core::errors::RagError;
use crate::embed::Embedder;
use crate::llm::TextGenerator;
use crate::prompt::PromptTemplate;
use crate::store::{SearchHit, VectorStore};

use super::template::{answer_template, build_context};

/// Either a synthesised answer or, without a generator, the raw hits.
#[derive(Debug, Clone)]
pub enum Answer {
    Generated(String),
    Documents(Vec<SearchHit>),
}

pub struct RetrievalPipeline<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    generator: Option<&'a dyn TextGenerator>,
    template: PromptTemplate,
    top_k: usize,
}

impl<'a> RetrievalPipeline<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        config: &RetrievalConfig,
    ) -> Result<Self, RagError> {
        Ok(Self {
            embedder,
            store,
            generator: None,
            template: answer_template(&config.subject_domain)?,
            top_k: config.top_k,
        })
    }

    pub fn with_generator(mut self, generator: &'a dyn TextGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The `top_k` stored chunks closest to `query`.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>, RagError> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let hits = self.store.search(&query_embedding, self.top_k).await?;
        tracing::debug!("Retrieved {} chunks for query", hits.len());
        Ok(hits)
    }

    pub fn render_prompt(&self, context: &str, question: &str) -> Result<String, RagError> {
        self.template
            .render(&[("context", context), ("question", question)])
    }

    pub async fn answer(&self, query: &str) -> Result<Answer, RagError> {
        let hits = self.retrieve(query).await?;
        let Some(generator) = self.generator else {
            return Ok(Answer::Documents(hits));
        };

        let prompt = self.render_prompt(&build_context(&hits), query)?;
        tracing::info!("Generating answer with {}", generator.name());
        let text = generator.generate(&prompt).await?;
        Ok(Answer::Generated(text.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::document::Document;
    use crate::store::{MemoryVectorStore, StoredRecord};

    /// Embeds by keyword presence so similarity is predictable.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        fn dimensions(&self) -> usize {
            3
        }

        async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let text = text.to_lowercase();
                    ["mongodb", "sky", "skills"]
                        .iter()
                        .map(|word| if text.contains(word) { 1.0 } else { 0.01 })
                        .collect()
                })
                .collect())
        }
    }

    struct Recording {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, prompt: &str) -> Result<String, RagError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("  In version 4.0.  ".to_string())
        }
    }

    fn config(top_k: usize) -> RetrievalConfig {
        RetrievalConfig {
            top_k,
            num_candidates: 30,
            subject_domain: "MongoDB".to_string(),
        }
    }

    async fn seeded_store() -> MemoryVectorStore {
        let store = MemoryVectorStore::new();
        let texts = [
            "MongoDB added multi-document transactions.",
            "Rayleigh scattering makes the sky blue.",
            "Skills: Rust, MongoDB.",
        ];
        let embeddings = KeywordEmbedder
            .embed_documents(texts.iter().map(|t| t.to_string()).collect())
            .await
            .unwrap();
        let records = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| StoredRecord::new(Document::new(*text), embedding))
            .collect();
        store.insert_batch(records).await.unwrap();
        store
    }

    #[tokio::test]
    async fn without_generator_returns_documents() {
        let store = seeded_store().await;
        let pipeline = RetrievalPipeline::new(&KeywordEmbedder, &store, &config(1)).unwrap();

        match pipeline.answer("Why is the sky blue?").await.unwrap() {
            Answer::Documents(hits) => {
                assert_eq!(hits.len(), 1);
                assert!(hits[0].document.content.contains("sky"));
            }
            other => panic!("expected documents, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn generator_sees_joined_context_and_question() {
        let store = seeded_store().await;
        let generator = Recording {
            prompts: Mutex::new(Vec::new()),
        };
        let pipeline = RetrievalPipeline::new(&KeywordEmbedder, &store, &config(2))
            .unwrap()
            .with_generator(&generator);

        let question = "When did MongoDB begin supporting multi-document transactions?";
        let answer = pipeline.answer(question).await.unwrap();
        assert!(matches!(answer, Answer::Generated(ref text) if text == "In version 4.0."));

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\n\n"));
        assert!(prompts[0].contains(&format!("Question: {}", question)));
        assert!(prompts[0].contains("MongoDB added multi-document transactions."));
    }

    #[tokio::test]
    async fn empty_store_still_prompts_with_empty_context() {
        let store = MemoryVectorStore::new();
        let generator = Recording {
            prompts: Mutex::new(Vec::new()),
        };
        let pipeline = RetrievalPipeline::new(&KeywordEmbedder, &store, &config(3))
            .unwrap()
            .with_generator(&generator);

        pipeline.answer("anything").await.unwrap();
        assert!(generator.prompts.lock().unwrap()[0].contains("Context:\n\nQuestion: anything"));
    }
}
