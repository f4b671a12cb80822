use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::defaults::generate_default_config;
use super::paths::AppPaths;
use super::settings::AppConfig;
use super::validation::validate_config;
use crate::core::errors::RagError;

pub const CONNECTION_STRING_VAR: &str = "CONNECTION_STRING";
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const HUGGINGFACE_TOKEN_VAR: &str = "HUGGINGFACEHUB_API_TOKEN";

const REDACT_PLACEHOLDER: &str = "****";

const SENSITIVE_PATTERNS: [&str; 8] = [
    "api_key",
    "secret",
    "password",
    "_token",
    "token_",
    "credential",
    "connection_string",
    "bearer",
];

const SENSITIVE_WHITELIST: [&str; 2] = ["max_tokens", "tokens"];

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    /// Loads the `.env` file next to the project root into the process
    /// environment. Variables already set win over the file. Returns
    /// `Ok(false)` when there is no file.
    ///
    /// Runs before logging is installed, so the outcome is returned for the
    /// caller to report rather than logged here.
    pub fn load_env(&self) -> Result<bool, RagError> {
        let env_file = &self.paths.env_file;
        if !env_file.exists() {
            return Ok(false);
        }
        dotenvy::from_path(env_file).map_err(|err| {
            RagError::Config(format!("failed to read {}: {}", env_file.display(), err))
        })?;
        Ok(true)
    }

    pub fn load_raw(&self) -> Result<Value, RagError> {
        let file_config = load_yaml_file(&self.paths.config_file)?;
        let merged = deep_merge(&generate_default_config(), &file_config);
        validate_config(&merged)?;
        Ok(merged)
    }

    pub fn load_config(&self) -> Result<AppConfig, RagError> {
        Self::decode(self.load_raw()?)
    }

    /// Deserialises an already merged and validated raw config.
    pub fn decode(raw: Value) -> Result<AppConfig, RagError> {
        serde_json::from_value(raw)
            .map_err(|err| RagError::Config(format!("failed to decode config: {}", err)))
    }

    pub fn connection_string(&self) -> Result<String, RagError> {
        required_env(CONNECTION_STRING_VAR)
    }

    pub fn google_api_key(&self) -> Result<String, RagError> {
        required_env(GOOGLE_API_KEY_VAR)
    }

    pub fn huggingface_token(&self) -> Result<String, RagError> {
        required_env(HUGGINGFACE_TOKEN_VAR)
    }

    pub fn redact_sensitive_values(&self, value: &Value) -> Value {
        redact_sensitive_values(value)
    }
}

fn required_env(name: &str) -> Result<String, RagError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(RagError::Config(format!("{} is not set", name))),
    }
}

fn load_yaml_file(path: &Path) -> Result<Value, RagError> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|err| RagError::Config(format!("failed to read {}: {}", path.display(), err)))?;
    let value = serde_yaml::from_str::<Value>(&contents)
        .map_err(|err| RagError::Config(format!("failed to parse {}: {}", path.display(), err)))?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(RagError::Config(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
    }
}

fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged: Map<String, Value> = base_map.clone();
            for (key, value) in override_map {
                let merged_value = match merged.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Object(merged)
        }
        _ => override_value.clone(),
    }
}

fn redact_sensitive_values(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if is_sensitive_key(key) && !val.is_null() {
                    redacted.insert(key.clone(), Value::String(REDACT_PLACEHOLDER.to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_values(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_values).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    if SENSITIVE_WHITELIST
        .iter()
        .any(|allowed| *allowed == key_lower)
    {
        return false;
    }
    SENSITIVE_PATTERNS
        .iter()
        .any(|pattern| key_lower.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ProviderKind, TaggingMode};
    use serde_json::json;

    fn service_for(dir: &Path) -> ConfigService {
        let paths = AppPaths {
            project_root: dir.to_path_buf(),
            env_file: dir.join(".env"),
            config_file: dir.join("config.yml"),
            log_dir: dir.join("logs"),
        };
        ConfigService::new(Arc::new(paths))
    }

    #[test]
    fn deep_merge_merges_objects_and_overrides_scalars() {
        let base = json!({
            "a": 1,
            "b": { "c": 2, "d": 3 },
            "arr": [1, 2]
        });
        let override_value = json!({
            "b": { "c": 99 },
            "arr": [3],
            "e": "x"
        });

        let merged = deep_merge(&base, &override_value);

        assert_eq!(
            merged,
            json!({
                "a": 1,
                "b": { "c": 99, "d": 3 },
                "arr": [3],
                "e": "x"
            })
        );
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = service_for(dir.path()).load_config().unwrap();

        assert_eq!(config.database.name, "RAG-demo");
        assert_eq!(config.database.collection, "chunked_data");
        assert_eq!(config.database.index, "vector_index");
        assert_eq!(config.database.namespace(), "RAG-demo.chunked_data");
        assert_eq!(config.embedding.dimensions, 384);
        assert_eq!(config.ingest.chunk_size, 500);
        assert_eq!(config.ingest.chunk_overlap, 150);
        assert_eq!(config.ingest.tagging, TaggingMode::Llm);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.generation.provider, ProviderKind::Gemini);
        assert_eq!(config.generation.model, "gemini-2.5-flash");
    }

    #[test]
    fn yaml_file_overrides_selected_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yml"),
            "database:\n  name: langchain_demo\ningest:\n  tagging: placeholder\ngeneration:\n  provider: huggingface\n  model: HuggingFaceH4/zephyr-7b-beta\n",
        )
        .unwrap();

        let config = service_for(dir.path()).load_config().unwrap();
        assert_eq!(config.database.name, "langchain_demo");
        assert_eq!(config.database.collection, "chunked_data");
        assert_eq!(config.ingest.tagging, TaggingMode::Placeholder);
        assert_eq!(config.generation.provider, ProviderKind::Huggingface);
        assert_eq!(config.generation.model, "HuggingFaceH4/zephyr-7b-beta");
    }

    #[test]
    fn invalid_yaml_values_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yml"), "retrieval:\n  top_k: 0\n").unwrap();

        let err = service_for(dir.path()).load_config().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn non_mapping_yaml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yml"), "- just\n- a list\n").unwrap();

        assert!(service_for(dir.path()).load_raw().is_err());
    }

    #[test]
    fn redaction_masks_credentials_only() {
        let input = json!({
            "connection_string": "mongodb+srv://user:pw@host",
            "generation": { "api_key": "k", "max_tokens": 512 },
        });

        let redacted = redact_sensitive_values(&input);
        assert_eq!(
            redacted,
            json!({
                "connection_string": "****",
                "generation": { "api_key": "****", "max_tokens": 512 },
            })
        );
    }

    #[test]
    fn env_file_outcome_is_reported_to_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_for(dir.path());
        assert!(!service.load_env().unwrap());

        fs::write(dir.path().join(".env"), "PDFRAG_TEST_ENV_FILE_VALUE=loaded\n").unwrap();
        assert!(service.load_env().unwrap());
        assert_eq!(env::var("PDFRAG_TEST_ENV_FILE_VALUE").unwrap(), "loaded");
        env::remove_var("PDFRAG_TEST_ENV_FILE_VALUE");
    }

    #[test]
    fn unreadable_env_file_is_an_error_not_a_silent_skip() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env"), "PDFRAG_TEST_BROKEN=\"unterminated\n").unwrap();

        let err = service_for(dir.path()).load_env().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn blank_env_values_count_as_missing() {
        let name = "PDFRAG_TEST_BLANK_VALUE";
        env::set_var(name, "   ");
        let err = required_env(name).unwrap_err();
        assert!(err.to_string().contains(name));
        env::remove_var(name);
    }
}
