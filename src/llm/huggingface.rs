//! Hugging Face Inference API text-generation client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::TextGenerator;
use super::types::GenerationOptions;
use crate::core::errors::RagError;

pub const DEFAULT_HF_URL: &str = "https://router.huggingface.co/hf-inference/models";

pub struct HuggingFaceProvider {
    token: String,
    base_url: String,
    options: GenerationOptions,
    client: Client,
}

impl HuggingFaceProvider {
    pub fn new(
        token: String,
        base_url: Option<String>,
        options: GenerationOptions,
    ) -> Result<Self, RagError> {
        if token.trim().is_empty() {
            return Err(RagError::Config("missing Hugging Face token".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(RagError::internal)?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_HF_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            token,
            base_url,
            options,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.options.model)
    }

    fn request_body(&self, prompt: &str) -> Value {
        let mut parameters = json!({
            "max_new_tokens": self.options.max_tokens,
            "return_full_text": false,
        });
        // The inference API rejects temperature 0; greedy decoding is the equivalent.
        if let Some(obj) = parameters.as_object_mut() {
            if self.options.temperature > 0.0 {
                obj.insert("temperature".to_string(), json!(self.options.temperature));
            } else {
                obj.insert("do_sample".to_string(), json!(false));
            }
        }
        json!({ "inputs": prompt, "parameters": parameters })
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.token.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| RagError::Config("invalid Hugging Face token".to_string()))?,
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
                "Hugging Face returned {}: {}",
                status, text
            )));
        }

        let payload: Value = resp.json().await.map_err(RagError::generation)?;
        extract_generated_text(&payload)
    }
}

fn extract_generated_text(payload: &Value) -> Result<String, RagError> {
    let text = match payload {
        Value::Array(items) => items
            .first()
            .and_then(|item| item.get("generated_text"))
            .and_then(Value::as_str),
        Value::Object(_) => payload.get("generated_text").and_then(Value::as_str),
        _ => None,
    };
    text.map(str::to_string).ok_or_else(|| {
        RagError::Generation("Hugging Face response missing generated_text".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(temperature: f64) -> GenerationOptions {
        GenerationOptions {
            model: "HuggingFaceH4/zephyr-7b-beta".to_string(),
            temperature,
            max_tokens: 128,
        }
    }

    #[test]
    fn default_endpoint_is_the_inference_router() {
        let provider = HuggingFaceProvider::new("t".to_string(), None, options(0.0)).unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://router.huggingface.co/hf-inference/models/HuggingFaceH4/zephyr-7b-beta"
        );

        let custom = HuggingFaceProvider::new(
            "t".to_string(),
            Some("http://localhost:8080/".to_string()),
            options(0.0),
        )
        .unwrap();
        assert_eq!(custom.endpoint(), "http://localhost:8080/HuggingFaceH4/zephyr-7b-beta");
    }

    #[test]
    fn zero_temperature_switches_to_greedy() {
        let provider = HuggingFaceProvider::new("t".to_string(), None, options(0.0)).unwrap();
        let body = provider.request_body("q");
        assert_eq!(body["inputs"], "q");
        assert_eq!(body["parameters"]["do_sample"], false);
        assert!(body["parameters"].get("temperature").is_none());

        let provider = HuggingFaceProvider::new("t".to_string(), None, options(0.7)).unwrap();
        let body = provider.request_body("q");
        assert_eq!(body["parameters"]["temperature"], 0.7);
    }

    #[test]
    fn generated_text_is_read_from_list_or_object() {
        let list = json!([{ "generated_text": "one" }]);
        assert_eq!(extract_generated_text(&list).unwrap(), "one");

        let object = json!({ "generated_text": "two" });
        assert_eq!(extract_generated_text(&object).unwrap(), "two");

        let error = json!({ "error": "Model is currently loading" });
        assert!(extract_generated_text(&error).is_err());
    }
}
