use serde_json::{Map, Value};

use crate::core::errors::RagError;

const TAGGING_MODES: [&str; 3] = ["llm", "placeholder", "off"];
const PROVIDERS: [&str; 4] = ["gemini", "huggingface", "lmstudio", "none"];

pub fn validate_config(config: &Value) -> Result<(), RagError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(database) = expect_optional_object(root, "database")? {
        validate_required_string_field(database, "database.name", "name")?;
        validate_required_string_field(database, "database.collection", "collection")?;
        validate_required_string_field(database, "database.index", "index")?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_required_string_field(embedding, "embedding.model", "model")?;
        validate_u64_field(embedding, "embedding.dimensions", "dimensions", 1, 8192)?;
        validate_optional_string_field(embedding, "embedding.cache_dir", "cache_dir")?;
    }

    if let Some(ingest) = expect_optional_object(root, "ingest")? {
        validate_required_string_field(ingest, "ingest.source_pdf", "source_pdf")?;
        validate_u64_field(
            ingest,
            "ingest.min_words_per_page",
            "min_words_per_page",
            0,
            100_000,
        )?;
        validate_u64_field(ingest, "ingest.chunk_size", "chunk_size", 1, 1_000_000)?;
        validate_u64_field(ingest, "ingest.chunk_overlap", "chunk_overlap", 0, 1_000_000)?;
        validate_enum_field(ingest, "ingest.tagging", "tagging", &TAGGING_MODES)?;

        let size = ingest.get("chunk_size").and_then(Value::as_u64);
        let overlap = ingest.get("chunk_overlap").and_then(Value::as_u64);
        if let (Some(size), Some(overlap)) = (size, overlap) {
            if overlap >= size {
                return Err(RagError::Config(format!(
                    "Invalid config at 'ingest.chunk_overlap': {} must be smaller than chunk_size {}",
                    overlap, size
                )));
            }
        }
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_u64_field(retrieval, "retrieval.top_k", "top_k", 1, 1_000)?;
        validate_u64_field(
            retrieval,
            "retrieval.num_candidates",
            "num_candidates",
            1,
            10_000,
        )?;
        validate_required_string_field(retrieval, "retrieval.subject_domain", "subject_domain")?;

        let top_k = retrieval.get("top_k").and_then(Value::as_u64);
        let candidates = retrieval.get("num_candidates").and_then(Value::as_u64);
        if let (Some(top_k), Some(candidates)) = (top_k, candidates) {
            if candidates < top_k {
                return Err(RagError::Config(format!(
                    "Invalid config at 'retrieval.num_candidates': {} is below top_k {}",
                    candidates, top_k
                )));
            }
        }
    }

    if let Some(generation) = expect_optional_object(root, "generation")? {
        validate_enum_field(generation, "generation.provider", "provider", &PROVIDERS)?;
        validate_required_string_field(generation, "generation.model", "model")?;
        validate_f64_field(generation, "generation.temperature", "temperature", 0.0, 2.0)?;
        validate_u64_field(generation, "generation.max_tokens", "max_tokens", 1, 1_000_000)?;
        validate_optional_string_field(generation, "generation.base_url", "base_url")?;
    }

    if let Some(logging) = expect_optional_object(root, "logging")? {
        validate_required_string_field(logging, "logging.level", "level")?;
        validate_bool_field(logging, "logging.file", "file")?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, RagError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_bool_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_bool().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "boolean"))
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(RagError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(RagError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_required_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), RagError> {
    let value = section.get(key).ok_or_else(|| {
        RagError::Config(format!("Invalid config at '{}': value is required", path))
    })?;
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if text.trim().is_empty() {
        return Err(RagError::Config(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), RagError> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(()),
        Some(value) if value.is_string() => Ok(()),
        Some(_) => Err(config_type_error(path, "string")),
    }
}

fn validate_enum_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    allowed: &[&str],
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Err(config_type_error(path, "string"));
    };
    if !allowed.contains(&text) {
        return Err(RagError::Config(format!(
            "Invalid config at '{}': '{}' is not one of {}",
            path,
            text,
            allowed.join(", ")
        )));
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> RagError {
    RagError::Config(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::defaults::generate_default_config;
    use serde_json::json;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&generate_default_config()).is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let config = json!({
            "ingest": {
                "source_pdf": "a.pdf",
                "chunk_size": 100,
                "chunk_overlap": 100,
            }
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("ingest.chunk_overlap"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = json!({
            "generation": { "provider": "bard", "model": "x" }
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("'bard' is not one of"));
    }

    #[test]
    fn wrong_types_are_reported_with_path() {
        let config = json!({ "retrieval": { "top_k": "three", "subject_domain": "x" } });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("retrieval.top_k"));

        let config = json!({ "logging": { "level": "info", "file": "yes" } });
        assert!(validate_config(&config).is_err());

        let config = json!({ "database": [] });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn candidates_cannot_be_below_top_k() {
        let config = json!({
            "retrieval": { "top_k": 5, "num_candidates": 2, "subject_domain": "MongoDB" }
        });
        assert!(validate_config(&config).is_err());
    }
}
