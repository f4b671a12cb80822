use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths, ConfigService};
use crate::core::logging;
use crate::embed::FastEmbedder;
use crate::llm::{build_generator, TextGenerator};
use crate::store::AtlasVectorStore;

pub mod error;

pub use error::InitializationError;

/// Per-process state shared by the entry points: resolved paths, the
/// loaded configuration and factories for the external services.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config_service: ConfigService,
    pub config: AppConfig,
}

impl AppState {
    /// Loads `.env` and `config.yml`, then installs logging with
    /// `log_prefix` as the log file name. What happened while loading is
    /// logged once the subscriber is in place.
    pub fn initialize(log_prefix: &str) -> Result<Self, InitializationError> {
        let paths = Arc::new(AppPaths::new());
        let config_service = ConfigService::new(paths.clone());
        let env_outcome = config_service.load_env();

        let raw = config_service
            .load_raw()
            .map_err(InitializationError::Config)?;
        let config = ConfigService::decode(raw.clone()).map_err(InitializationError::Config)?;
        logging::init(&paths, &config.logging, log_prefix);

        tracing::debug!("Project root: {}", paths.project_root.display());
        match env_outcome {
            Ok(true) => tracing::debug!("Loaded {}", paths.env_file.display()),
            Ok(false) => tracing::debug!("No env file at {}", paths.env_file.display()),
            Err(err) => tracing::warn!("{}", err),
        }
        tracing::debug!(
            config = %config_service.redact_sensitive_values(&raw),
            "Effective configuration"
        );

        Ok(Self {
            paths,
            config_service,
            config,
        })
    }

    /// Opens the one database client this process uses. Callers close it
    /// with [`AtlasVectorStore::close`] before exiting.
    pub async fn connect_store(&self) -> Result<AtlasVectorStore, InitializationError> {
        let connection_string = self
            .config_service
            .connection_string()
            .map_err(InitializationError::Config)?;
        let store = AtlasVectorStore::connect(&connection_string, &self.config.database)
            .await
            .map_err(InitializationError::Store)?;
        Ok(store.with_num_candidates(self.config.retrieval.num_candidates))
    }

    pub async fn load_embedder(&self) -> Result<FastEmbedder, InitializationError> {
        FastEmbedder::new(&self.config.embedding)
            .await
            .map_err(InitializationError::Embedder)
    }

    pub fn generator(&self) -> Result<Option<Arc<dyn TextGenerator>>, InitializationError> {
        build_generator(&self.config.generation, &self.config_service)
            .map_err(InitializationError::Generator)
    }

    /// Resolves a config path such as `ingest.source_pdf` against the root.
    pub fn resolve(&self, relative: &str) -> std::path::PathBuf {
        self.paths.resolve(relative)
    }
}
