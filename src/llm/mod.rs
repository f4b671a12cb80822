pub mod gemini;
pub mod huggingface;
pub mod lmstudio;
pub mod provider;
pub mod types;

use std::sync::Arc;

pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use lmstudio::LmStudioProvider;
pub use provider::{TextGenerator, Unavailable};
pub use types::{ChatMessage, GenerationOptions};

use crate::core::config::{ConfigService, GenerationConfig, ProviderKind};
use crate::core::errors::RagError;

/// Builds the configured generator, or `None` when generation is disabled.
/// Missing credentials for the selected provider are configuration errors.
pub fn build_generator(
    config: &GenerationConfig,
    service: &ConfigService,
) -> Result<Option<Arc<dyn TextGenerator>>, RagError> {
    let options = GenerationOptions::from_config(config);
    let generator: Arc<dyn TextGenerator> = match config.provider {
        ProviderKind::None => return Ok(None),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            service.google_api_key()?,
            config.base_url.clone(),
            options,
        )?),
        ProviderKind::Huggingface => Arc::new(HuggingFaceProvider::new(
            service.huggingface_token()?,
            config.base_url.clone(),
            options,
        )?),
        ProviderKind::Lmstudio => Arc::new(LmStudioProvider::new(
            config
                .base_url
                .clone()
                .unwrap_or_else(|| lmstudio::DEFAULT_LMSTUDIO_URL.to_string()),
            options,
        )),
    };
    tracing::info!("Using {} for text generation", generator.name());
    Ok(Some(generator))
}
