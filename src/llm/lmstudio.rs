use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::TextGenerator;
use super::types::{ChatMessage, GenerationOptions};
use crate::core::errors::RagError;

pub const DEFAULT_LMSTUDIO_URL: &str = "http://localhost:1234";

/// OpenAI-compatible local server (LM Studio and friends).
#[derive(Clone)]
pub struct LmStudioProvider {
    base_url: String,
    options: GenerationOptions,
    client: Client,
}

impl LmStudioProvider {
    pub fn new(base_url: String, options: GenerationOptions) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            options,
            client: Client::new(),
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.options.model,
            "messages": [ChatMessage::user(prompt)],
            "stream": false,
            "temperature": self.options.temperature,
            "max_tokens": self.options.max_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for LmStudioProvider {
    fn name(&self) -> &str {
        "lmstudio"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let res = self
            .client
            .post(&url)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(RagError::generation)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Generation(format!(
                "LM Studio returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(RagError::generation)?;
        extract_chat_content(&payload)
    }
}

fn extract_chat_content(payload: &Value) -> Result<String, RagError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RagError::Generation("LM Studio response missing message content".to_string()))
}
