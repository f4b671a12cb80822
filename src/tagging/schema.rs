//! Declarative description of the metadata fields a tagger extracts.

use serde_json::{json, Map, Value};

use crate::core::errors::RagError;
use crate::document::Metadata;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn array_of(item: FieldType) -> Self {
        FieldType::Array(Box::new(item))
    }

    fn to_json(&self) -> Value {
        match self {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Number => json!({ "type": "number" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::Array(item) => json!({ "type": "array", "items": item.to_json() }),
        }
    }

    fn from_json(path: &str, value: &Value) -> Result<Self, RagError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| schema_error(path, "missing \"type\""))?;
        match kind {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "integer" => Ok(FieldType::Integer),
            "boolean" => Ok(FieldType::Boolean),
            "array" => {
                let items = value
                    .get("items")
                    .ok_or_else(|| schema_error(path, "array without \"items\""))?;
                let item = FieldType::from_json(&format!("{}.items", path), items)?;
                Ok(FieldType::array_of(item))
            }
            other => Err(schema_error(path, &format!("unsupported type '{}'", other))),
        }
    }

    /// Type-appropriate stand-in used when tagging is skipped.
    pub fn placeholder(&self) -> Value {
        match self {
            FieldType::String => Value::String("unknown".to_string()),
            FieldType::Number | FieldType::Integer => json!(0),
            FieldType::Boolean => Value::Bool(false),
            FieldType::Array(_) => Value::Array(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSchema {
    fields: Vec<SchemaField>,
}

impl MetadataSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &str, field_type: FieldType) -> Self {
        self.field(name, field_type, true)
    }

    pub fn optional(self, name: &str, field_type: FieldType) -> Self {
        self.field(name, field_type, false)
    }

    fn field(mut self, name: &str, field_type: FieldType, required: bool) -> Self {
        self.fields.retain(|field| field.name != name);
        self.fields.push(SchemaField {
            name: name.to_string(),
            field_type,
            required,
        });
        self
    }

    /// `title`, `keywords` and `hasCode`, all required.
    pub fn document_default() -> Self {
        Self::new()
            .required("title", FieldType::String)
            .required("keywords", FieldType::array_of(FieldType::String))
            .required("hasCode", FieldType::Boolean)
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    pub fn required_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.as_str())
            .collect()
    }

    /// `{"properties": {...}, "required": [...]}`, the form shown to the
    /// model and compiled for validation.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field.field_type.to_json());
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_names(),
        })
    }

    pub fn from_json(value: &Value) -> Result<Self, RagError> {
        let properties = value
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| schema_error("properties", "expected an object"))?;

        let required: Vec<&str> = match value.get("required") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| schema_error("required", "expected strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(schema_error("required", "expected an array")),
        };

        for name in &required {
            if !properties.contains_key(*name) {
                return Err(schema_error(
                    "required",
                    &format!("'{}' is not a declared property", name),
                ));
            }
        }

        let mut schema = Self::new();
        for (name, definition) in properties {
            let field_type = FieldType::from_json(&format!("properties.{}", name), definition)?;
            schema = schema.field(name, field_type, required.contains(&name.as_str()));
        }
        Ok(schema)
    }

    /// Keeps only the declared properties of `extracted`.
    pub fn retain_declared(&self, extracted: Metadata) -> Metadata {
        extracted
            .into_iter()
            .filter(|(key, _)| self.is_declared(key))
            .collect()
    }

    pub fn placeholder_metadata(&self) -> Metadata {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| (field.name.clone(), field.field_type.placeholder()))
            .collect()
    }
}

fn schema_error(path: &str, message: &str) -> RagError {
    RagError::Config(format!("Invalid schema at '{}': {}", path, message))
}
