use serde::{Deserialize, Serialize};

use crate::core::config::GenerationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling knobs shared by every provider.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationOptions {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}
