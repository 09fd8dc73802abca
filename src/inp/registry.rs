//! Section handler registry
//!
//! Maps section names to the handler that parses them. The built-in registry is
//! built once and never mutated; callers wanting custom or replacement sections
//! build their own [`Registry`] and hand it to a
//! [`Reader`](crate::inp::document::Reader), where it is consulted before the
//! base registry for that read only.

use crate::inp::schema::{RecordType, Schema, TypedSchema};
use crate::inp::sections;
use crate::inp::settings::SettingsKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static BUILTIN: Lazy<Registry> = Lazy::new(Registry::with_builtins);

/// How a named section is parsed.
#[derive(Debug, Clone)]
pub enum Handler {
    /// Free text, one line per source line.
    Title,
    /// Ordered key → value settings.
    Settings(SettingsKind),
    /// Typed records in a keyed container.
    Objects(Arc<dyn Schema>),
}

impl Handler {
    pub fn objects<T: RecordType>() -> Self {
        Handler::Objects(TypedSchema::<T>::shared())
    }

    pub fn describe(&self) -> String {
        match self {
            Handler::Title => "title".to_string(),
            Handler::Settings(kind) => format!("settings ({})", kind.section_name()),
            Handler::Objects(schema) => format!("objects ({})", schema.kind()),
        }
    }
}

/// Section name → handler. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    handlers: HashMap<String, Handler>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Registry {
            handlers: HashMap::new(),
        }
    }

    /// Shared, read-only registry of the built-in sections.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// A fresh registry holding the built-in sections.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        sections::register_builtins(&mut registry);
        registry
    }

    /// Register a handler, returning the one it replaces.
    pub fn register(&mut self, section: &str, handler: Handler) -> Option<Handler> {
        self.handlers.insert(normalize(section), handler)
    }

    pub fn register_record<T: RecordType>(&mut self, section: &str) -> Option<Handler> {
        self.register(section, Handler::objects::<T>())
    }

    pub fn register_schema(&mut self, section: &str, schema: Arc<dyn Schema>) -> Option<Handler> {
        self.register(section, Handler::Objects(schema))
    }

    pub fn unregister(&mut self, section: &str) -> Option<Handler> {
        self.handlers.remove(&normalize(section))
    }

    pub fn get(&self, section: &str) -> Option<&Handler> {
        self.handlers.get(&normalize(section))
    }

    pub fn contains(&self, section: &str) -> bool {
        self.handlers.contains_key(&normalize(section))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered section names (sorted).
    pub fn section_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// A copy of this registry with `overrides` layered on top.
    pub fn merged(&self, overrides: &Registry) -> Registry {
        let mut merged = self.clone();
        for (name, handler) in &overrides.handlers {
            merged.handlers.insert(name.clone(), handler.clone());
        }
        merged
    }
}

pub(crate) fn normalize(section: &str) -> String {
    section.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inp::sections::network::Junction;

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_builtin_registry_covers_known_sections() {
        let registry = Registry::builtin();
        for name in ["TITLE", "OPTIONS", "REPORT", "JUNCTIONS", "CURVES", "CONTROLS", "TAGS"] {
            assert!(registry.contains(name), "{name}");
        }
        assert!(!registry.contains("STREETS"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = Registry::new();
        registry.register_record::<Junction>("junctions");
        assert!(registry.contains("JUNCTIONS"));
        assert!(matches!(registry.get("Junctions"), Some(Handler::Objects(_))));
    }

    #[test]
    fn test_merged_overrides_without_touching_base() {
        let mut overrides = Registry::new();
        overrides.register("JUNCTIONS", Handler::Title);

        let merged = Registry::builtin().merged(&overrides);
        assert!(matches!(merged.get("JUNCTIONS"), Some(Handler::Title)));
        assert!(matches!(
            Registry::builtin().get("JUNCTIONS"),
            Some(Handler::Objects(_))
        ));
        assert_eq!(merged.len(), Registry::builtin().len());
    }

    #[test]
    fn test_unregister() {
        let mut registry = Registry::with_builtins();
        assert!(registry.unregister("TAGS").is_some());
        assert!(!registry.contains("TAGS"));
    }
}
