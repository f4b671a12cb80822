use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::RagError;

/// Anything that turns a rendered prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// provider name (e.g. "gemini", "huggingface", "lmstudio")
    fn name(&self) -> &str;

    /// single-shot, non-streaming completion
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<'a, T: TextGenerator + ?Sized> TextGenerator for &'a T {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        (**self).generate(prompt).await
    }
}

/// Stand-in used when a stage needs a generator but none is configured.
/// Every call fails, so callers fall back to their no-model behaviour.
pub struct Unavailable;

#[async_trait]
impl TextGenerator for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, RagError> {
        Err(RagError::Generation(
            "no text generation provider is configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_always_fails() {
        let generator: Arc<dyn TextGenerator> = Arc::new(Unavailable);
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
        assert_eq!(generator.name(), "unavailable");
    }
}
