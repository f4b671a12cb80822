//! Metadata tagging stage.
//!
//! - `MetadataTagger`: asks a text generator for schema-shaped metadata
//! - `PlaceholderTagger`: fills required fields without a model call
//! - `DocumentTransformer`: the contract both implement

mod parser;
mod placeholder;
mod schema;
mod tagger;
mod transformer;

pub use parser::parse_json_object;
pub use placeholder::PlaceholderTagger;
pub use schema::{FieldType, MetadataSchema, SchemaField};
pub use tagger::{MetadataTagger, TagFailure, TaggingReport};
pub use transformer::DocumentTransformer;
