//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider::TextGenerator;
use super::types::GenerationOptions;
use crate::core::errors::RagError;

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    options: GenerationOptions,
    client: Client,
}

impl GeminiProvider {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        options: GenerationOptions,
    ) -> Result<Self, RagError> {
        if api_key.trim().is_empty() {
            return Err(RagError::Config("missing Gemini API key".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(RagError::internal)?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            api_key,
            base_url,
            options,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.options.model
        )
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.options.temperature,
                max_output_tokens: self.options.max_tokens,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(self.api_key.trim())
                .map_err(|_| RagError::Config("invalid Gemini API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .client
            .post(self.endpoint())
            .headers(headers)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(RagError::generation)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RagError::Generation(format!(
                "Gemini returned {}: {}",
                status, text
            )));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(RagError::generation)?;
        collect_text(parsed)
    }
}

fn collect_text(response: GenerateResponse) -> Result<String, RagError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    if text.is_empty() {
        return Err(RagError::Generation(
            "Gemini response missing text content".to_string(),
        ));
    }
    Ok(text)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(
            "key".to_string(),
            None,
            GenerationOptions {
                model: "gemini-2.5-flash".to_string(),
                temperature: 0.0,
                max_tokens: 256,
            },
        )
        .unwrap()
    }

    #[test]
    fn empty_key_is_a_config_error() {
        let err = GeminiProvider::new(
            " ".to_string(),
            None,
            GenerationOptions {
                model: "m".to_string(),
                temperature: 0.0,
                max_tokens: 1,
            },
        )
        .err()
        .unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let provider = provider();
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        let body = serde_json::to_value(provider.request_body("hi")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn text_parts_are_concatenated() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": " 1}" }] } }]
        }))
        .unwrap();
        assert_eq!(collect_text(response).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn blocked_response_is_an_error() {
        let response: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(collect_text(response).is_err());
    }
}
