//! Fluent assertions for documents
//!
//! Checking a parsed document by hand means matching on section variants and
//! downcasting records at every step. The helpers here walk the document for
//! you and panic with a message naming the section, key and field involved:
//!
//! ```text
//! assert_document(&doc)
//!     .section_names(&["TITLE", "JUNCTIONS"])
//!     .objects("JUNCTIONS", |junctions| {
//!         junctions
//!             .count(2)
//!             .record("J1", |j1| {
//!                 j1.field("Elevation", 10.5).missing("SnowPack");
//!             });
//!     });
//! ```

use crate::inp::coercion::Value;
use crate::inp::document::{Document, Section};
use crate::inp::record::{Key, Record};
use crate::inp::section::SectionContainer;

/// Start an assertion chain over a document.
pub fn assert_document(doc: &Document) -> DocumentAssertion<'_> {
    DocumentAssertion { doc }
}

pub struct DocumentAssertion<'a> {
    doc: &'a Document,
}

impl<'a> DocumentAssertion<'a> {
    /// Assert the exact section names, in order
    pub fn section_names(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.doc.names().collect();
        assert_eq!(actual, expected, "section names differ");
        self
    }

    pub fn section_count(self, expected: usize) -> Self {
        assert_eq!(
            self.doc.len(),
            expected,
            "expected {} sections, found [{}]",
            expected,
            self.doc.names().collect::<Vec<_>>().join(", ")
        );
        self
    }

    pub fn has_section(self, name: &str) -> Self {
        assert!(self.doc.contains(name), "expected section [{name}]");
        self
    }

    pub fn lacks_section(self, name: &str) -> Self {
        assert!(!self.doc.contains(name), "unexpected section [{name}]");
        self
    }

    pub fn title(self, expected: &str) -> Self {
        assert_eq!(self.doc.title(), Some(expected), "title differs");
        self
    }

    /// Assert one setting of a settings section
    pub fn setting(self, section: &str, label: &str, expected: impl Into<Value>) -> Self {
        let settings = self
            .doc
            .settings(section)
            .unwrap_or_else(|| panic!("[{section}] is not a settings section"));
        assert_eq!(
            settings.get(label),
            Some(&expected.into()),
            "[{section}] {label} differs"
        );
        self
    }

    /// Assert the verbatim lines of a section without a handler
    pub fn raw(self, section: &str, expected: &[&str]) -> Self {
        match self.doc.section(section) {
            Some(Section::Raw(raw)) => assert_eq!(raw.lines, expected, "[{section}] lines differ"),
            other => panic!("[{section}] is not a raw section: {other:?}"),
        }
        self
    }

    /// Assert on an object section
    pub fn objects<F>(self, section: &str, assertion: F) -> Self
    where
        F: FnOnce(ObjectsAssertion<'a>),
    {
        let container = self
            .doc
            .objects(section)
            .unwrap_or_else(|| panic!("[{section}] is not an object section"));
        assertion(ObjectsAssertion {
            container,
            context: format!("[{section}]"),
        });
        self
    }
}

pub struct ObjectsAssertion<'a> {
    container: &'a SectionContainer,
    context: String,
}

impl<'a> ObjectsAssertion<'a> {
    pub fn count(self, expected: usize) -> Self {
        assert_eq!(
            self.container.len(),
            expected,
            "{}: expected {} records, found {}",
            self.context,
            expected,
            self.container.len()
        );
        self
    }

    /// Assert record keys, in order
    pub fn keys(self, expected: &[&str]) -> Self {
        let actual: Vec<String> = self.container.keys().map(Key::to_string).collect();
        assert_eq!(actual, expected, "{}: keys differ", self.context);
        self
    }

    pub fn kind(self, expected: &str) -> Self {
        assert_eq!(
            self.container.schema().kind(),
            expected,
            "{}: record kind differs",
            self.context
        );
        self
    }

    pub fn record<K, F>(self, key: K, assertion: F) -> Self
    where
        K: Into<Key>,
        F: FnOnce(RecordAssertion<'a>),
    {
        let key = key.into();
        let record = self
            .container
            .get(&key)
            .unwrap_or_else(|| panic!("{}: no record `{key}`", self.context));
        assertion(RecordAssertion {
            record,
            context: format!("{} {key}", self.context),
        });
        self
    }
}

pub struct RecordAssertion<'a> {
    record: &'a dyn Record,
    context: String,
}

impl RecordAssertion<'_> {
    pub fn field(self, name: &str, expected: impl Into<Value>) -> Self {
        let actual = self
            .record
            .get(name)
            .unwrap_or_else(|err| panic!("{}: {err}", self.context));
        assert_eq!(actual, expected.into(), "{}.{name} differs", self.context);
        self
    }

    /// Assert the rendered text of a field
    pub fn renders(self, name: &str, expected: &str) -> Self {
        let actual = self
            .record
            .get(name)
            .unwrap_or_else(|err| panic!("{}: {err}", self.context));
        assert_eq!(actual.render(), expected, "{}.{name} renders differently", self.context);
        self
    }

    pub fn missing(self, name: &str) -> Self {
        let actual = self
            .record
            .get(name)
            .unwrap_or_else(|err| panic!("{}: {err}", self.context));
        assert!(actual.is_missing(), "{}.{name} is {actual:?}, expected missing", self.context);
        self
    }

    /// Assert how many lines the record writes
    pub fn line_count(self, expected: usize) -> Self {
        assert_eq!(
            self.record.to_tokens().len(),
            expected,
            "{}: line count differs",
            self.context
        );
        self
    }
}
