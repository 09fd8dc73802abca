//! Document model
//!
//! A [`Document`] is an ordered map from section name to [`Section`]. Section
//! order follows the source text and is kept on write. Reading is done by a
//! [`Reader`], which resolves each section name against a [`Registry`] (plus an
//! optional per-read override registry) and builds the matching section kind:
//!
//! - `Handler::Title`: free text
//! - `Handler::Settings`: a [`SettingsSection`]
//! - `Handler::Objects`: a [`SectionContainer`] of typed records
//! - no handler: a [`RawSection`] written back verbatim
//!
//! Reading is fail-fast: the first malformed record aborts the read with a
//! [`SectionError`] naming the section and line.

use crate::inp::config::WriteOptions;
use crate::inp::error::{ParseError, SchemaError, SectionError};
use crate::inp::formats::inp::render_document;
use crate::inp::lexing::{tokenize, SectionBlock, Tokens};
use crate::inp::registry::{normalize, Handler, Registry};
use crate::inp::section::SectionContainer;
use crate::inp::settings::SettingsSection;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Lines of a section nobody registered a handler for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawSection {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section {
    Title(String),
    Settings(SettingsSection),
    Objects(SectionContainer),
    Raw(RawSection),
}

impl Section {
    /// Empty section of the kind a handler produces.
    fn for_handler(handler: Option<&Handler>) -> Self {
        match handler {
            Some(Handler::Title) => Section::Title(String::new()),
            Some(Handler::Settings(kind)) => Section::Settings(SettingsSection::new(*kind)),
            Some(Handler::Objects(schema)) => {
                Section::Objects(SectionContainer::new(Arc::clone(schema)))
            }
            None => Section::Raw(RawSection::default()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Section::Title(_) => "title",
            Section::Settings(_) => "settings",
            Section::Objects(_) => "objects",
            Section::Raw(_) => "raw",
        }
    }

    /// Number of records, settings or lines held.
    pub fn len(&self) -> usize {
        match self {
            Section::Title(text) => text.lines().count(),
            Section::Settings(settings) => settings.len(),
            Section::Objects(container) => container.len(),
            Section::Raw(raw) => raw.lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<SectionContainer> for Section {
    fn from(container: SectionContainer) -> Self {
        Section::Objects(container)
    }
}

impl From<SettingsSection> for Section {
    fn from(settings: SettingsSection) -> Self {
        Section::Settings(settings)
    }
}

impl From<RawSection> for Section {
    fn from(raw: RawSection) -> Self {
        Section::Raw(raw)
    }
}

/// An in-memory project file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sections: IndexMap<String, Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse text with the built-in sections.
    pub fn read(text: &str) -> Result<Document, ParseError> {
        Reader::new().read(text)
    }

    /// Serialize to project text. `fast` writes one line per record instead
    /// of aligned tables.
    pub fn write(&self, fast: bool) -> String {
        self.write_with(&WriteOptions {
            fast,
            ..WriteOptions::default()
        })
    }

    pub fn write_with(&self, options: &WriteOptions) -> String {
        render_document(self, options)
    }

    /// Add or replace a section. A replaced section keeps its position.
    pub fn add_section(&mut self, name: &str, section: impl Into<Section>) -> Option<Section> {
        self.sections.insert(normalize(name), section.into())
    }

    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.sections.shift_remove(&normalize(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(&normalize(name))
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(&normalize(name))
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.get_mut(&normalize(name))
    }

    pub fn objects(&self, name: &str) -> Option<&SectionContainer> {
        match self.section(name)? {
            Section::Objects(container) => Some(container),
            _ => None,
        }
    }

    pub fn objects_mut(&mut self, name: &str) -> Option<&mut SectionContainer> {
        match self.section_mut(name)? {
            Section::Objects(container) => Some(container),
            _ => None,
        }
    }

    pub fn settings(&self, name: &str) -> Option<&SettingsSection> {
        match self.section(name)? {
            Section::Settings(settings) => Some(settings),
            _ => None,
        }
    }

    pub fn settings_mut(&mut self, name: &str) -> Option<&mut SettingsSection> {
        match self.section_mut(name)? {
            Section::Settings(settings) => Some(settings),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.sections.values().find_map(|section| match section {
            Section::Title(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Section names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections
            .iter()
            .map(|(name, section)| (name.as_str(), section))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.sections.iter())
    }
}

/// Parses project text against a registry.
///
/// ```text
/// let mut custom = Registry::new();
/// custom.register_record::<Street>("STREETS");
/// let doc = Reader::new().with_custom(&custom).read(&text)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    base: &'a Registry,
    custom: Option<&'a Registry>,
}

impl Reader<'static> {
    /// Reader over the built-in sections.
    pub fn new() -> Self {
        Reader {
            base: Registry::builtin(),
            custom: None,
        }
    }
}

impl Default for Reader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Reader<'a> {
    pub fn with_registry(base: &'a Registry) -> Self {
        Reader { base, custom: None }
    }

    /// Consult `custom` before the base registry. Neither registry is modified.
    pub fn with_custom(self, custom: &'a Registry) -> Self {
        Reader {
            custom: Some(custom),
            ..self
        }
    }

    pub fn resolve(&self, section: &str) -> Option<&'a Handler> {
        self.custom
            .and_then(|custom| custom.get(section))
            .or_else(|| self.base.get(section))
    }

    pub fn read(&self, text: &str) -> Result<Document, ParseError> {
        let mut document = Document::new();
        for block in tokenize(text)? {
            let span = tracing::debug_span!("section", name = %block.name);
            let _entered = span.enter();

            let handler = self.resolve(&block.name);
            if handler.is_none() {
                tracing::debug!("no handler, keeping raw lines");
            }
            let section = document
                .sections
                .entry(normalize(&block.name))
                .or_insert_with(|| Section::for_handler(handler));
            absorb(section, handler, block)?;
        }
        Ok(document)
    }
}

fn absorb(
    section: &mut Section,
    handler: Option<&Handler>,
    block: SectionBlock,
) -> Result<(), SectionError> {
    let SectionBlock {
        name,
        header_index,
        lines,
        raw_lines,
    } = block;

    match (handler, section) {
        (Some(Handler::Title), Section::Title(text)) => {
            let body: Vec<&str> = raw_lines
                .iter()
                .map(|line| line.trim_end())
                .filter(|line| !line.trim_start().starts_with(';'))
                .collect();
            if !text.is_empty() && !body.is_empty() {
                text.push('\n');
            }
            text.push_str(&body.join("\n"));
            Ok(())
        }
        (Some(Handler::Settings(_)), Section::Settings(settings)) => {
            for line in &lines {
                settings
                    .push_tokens(&line.tokens)
                    .map_err(|err| SectionError::new(&name, line.index, err))?;
            }
            settings
                .finish()
                .map_err(|err| SectionError::new(&name, header_index, err))
        }
        (Some(Handler::Objects(schema)), Section::Objects(container)) => {
            for group in schema.group(lines) {
                let group = group.map_err(|err| {
                    let line_index = err.line_index().unwrap_or(header_index);
                    SectionError::new(&name, line_index, err)
                })?;
                let start = group.first().map_or(header_index, |line| line.index);
                let tokens: Vec<Tokens> = group.into_iter().map(|line| line.tokens).collect();

                let record = schema
                    .from_tokens(&tokens)
                    .map_err(|err| SectionError::new(&name, err.line_index().unwrap_or(start), err))?;
                let key = record.key();
                let replaced = container.put(record).map_err(|err| {
                    SectionError::new(&name, start, SchemaError::Malformed(err.to_string()))
                })?;
                if replaced.is_some() {
                    tracing::warn!(%key, line = start + 1, "duplicate key, earlier record replaced");
                }
            }
            Ok(())
        }
        (None, Section::Raw(raw)) => {
            raw.lines.extend(raw_lines);
            Ok(())
        }
        (_, section) => Err(SectionError::new(
            &name,
            header_index,
            SchemaError::Malformed(format!(
                "section was first read as {} and cannot be merged",
                section.kind_name()
            )),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inp::coercion::Value;
    use crate::inp::sections::network::Junction;

    const SMALL: &str = "[TITLE]
Small example

[OPTIONS]
FLOW_UNITS  CFS

[JUNCTIONS]
;;Name  Elevation
J1      10.5
J2      12

[STREETS]
S1 wide 10
";

    #[test]
    fn test_read_keeps_section_order() {
        let doc = Document::read(SMALL).unwrap();
        let names: Vec<&str> = doc.names().collect();
        assert_eq!(names, vec!["TITLE", "OPTIONS", "JUNCTIONS", "STREETS"]);
        assert_eq!(doc.title(), Some("Small example"));
        assert_eq!(doc.objects("junctions").map(SectionContainer::len), Some(2));
        assert_eq!(
            doc.settings("OPTIONS").and_then(|options| options.get("FLOW_UNITS")),
            Some(&Value::from("CFS"))
        );
    }

    #[test]
    fn test_unknown_section_is_raw() {
        let doc = Document::read(SMALL).unwrap();
        assert_eq!(
            doc.section("STREETS"),
            Some(&Section::Raw(RawSection {
                lines: vec!["S1 wide 10".into()]
            }))
        );
    }

    #[test]
    fn test_bad_record_names_section_and_line() {
        let err = Document::read("[JUNCTIONS]\nJ1 10\nJ2 high\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Schema(SectionError::new(
                "JUNCTIONS",
                2,
                SchemaError::invalid("Elevation", "high")
            ))
        );
    }

    #[test]
    fn test_repeated_section_merges() {
        let doc = Document::read("[JUNCTIONS]\nJ1 1\n[OPTIONS]\nA B\n[JUNCTIONS]\nJ2 2\n").unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.objects("JUNCTIONS").map(SectionContainer::len), Some(2));
    }

    #[test]
    fn test_duplicate_key_keeps_last() {
        let doc = Document::read("[JUNCTIONS]\nJ1 1\nJ2 2\nJ1 3\n").unwrap();
        let junctions = doc.objects("JUNCTIONS").unwrap();
        assert_eq!(junctions.len(), 2);
        assert_eq!(junctions.get_as::<Junction>("J1").map(|j| j.elevation), Some(3.0));
    }

    #[test]
    fn test_add_and_remove_sections() {
        let mut doc = Document::read(SMALL).unwrap();
        assert!(doc.remove_section("streets").is_some());
        assert!(!doc.contains("STREETS"));

        doc.add_section("COORDINATES", SectionContainer::of::<crate::inp::sections::network::Coordinate>());
        assert_eq!(doc.names().last(), Some("COORDINATES"));
    }

    #[test]
    fn test_custom_registry_overrides_builtin() {
        let mut custom = Registry::new();
        custom.register("JUNCTIONS", Handler::Title);
        let doc = Reader::new().with_custom(&custom).read(SMALL).unwrap();
        assert!(matches!(doc.section("JUNCTIONS"), Some(Section::Title(_))));
        assert!(matches!(
            Document::read(SMALL).unwrap().section("JUNCTIONS"),
            Some(Section::Objects(_))
        ));
    }
}
