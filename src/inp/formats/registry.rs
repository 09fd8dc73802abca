//! Format registry for document serialization
//!
//! Each format implements [`Formatter`] and is looked up by name in a
//! [`FormatRegistry`].

use crate::inp::document::Document;
use std::collections::HashMap;

/// Error that can occur during formatting
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    #[error("Format '{0}' not found")]
    FormatNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A way of turning a [`Document`] into text.
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g., "inp", "json")
    fn name(&self) -> &str;

    fn serialize(&self, doc: &Document) -> Result<String, SerializeError>;

    fn description(&self) -> &str {
        ""
    }
}

/// Registry of document formatters, keyed by name.
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter, replacing any with the same name.
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, SerializeError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| SerializeError::FormatNotFound(format.to_string()))?;
        formatter.serialize(doc)
    }

    /// All format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Format name and description pairs (sorted by name)
    pub fn describe(&self) -> Vec<(String, String)> {
        self.list_formats()
            .into_iter()
            .map(|name| {
                let description = self
                    .get(&name)
                    .map(|f| f.description().to_string())
                    .unwrap_or_default();
                (name, description)
            })
            .collect()
    }

    /// Registry with the built-in formats.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(super::InpFormatter::tables());
        registry.register(super::InpFormatter::fast());
        registry.register(super::JsonFormatter);
        registry.register(super::YamlFormatter);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
