//! Structured dumps of a document through serde

use super::registry::{Formatter, SerializeError};
use crate::inp::document::Document;

/// Pretty-printed JSON: sections → records → field → value.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, doc: &Document) -> Result<String, SerializeError> {
        serde_json::to_string_pretty(doc).map_err(|e| SerializeError::Serialization(e.to_string()))
    }

    fn description(&self) -> &str {
        "JSON dump of sections and records"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, doc: &Document) -> Result<String, SerializeError> {
        serde_yaml::to_string(doc).map_err(|e| SerializeError::Serialization(e.to_string()))
    }

    fn description(&self) -> &str {
        "YAML dump of sections and records"
    }
}
