//! Project text writer
//!
//! Sections are written in document order as `[NAME]`, the body, and a blank
//! line. Object sections whose schema allows it are written as aligned tables
//! with a commented header row; everything else, and every object section in
//! fast mode, gets one line per record line.

use super::registry::{Formatter, SerializeError};
use crate::inp::config::WriteOptions;
use crate::inp::document::{Document, Section};
use crate::inp::section::SectionContainer;

/// Body written for an object section without records.
pub const NO_DATA: &str = ";; No Data";

pub struct InpFormatter {
    name: &'static str,
    options: WriteOptions,
}

impl InpFormatter {
    pub fn new(name: &'static str, options: WriteOptions) -> Self {
        InpFormatter { name, options }
    }

    /// `inp`: aligned tables where the schema allows.
    pub fn tables() -> Self {
        Self::new("inp", WriteOptions::default())
    }

    /// `inp-fast`: one line per record line.
    pub fn fast() -> Self {
        Self::new(
            "inp-fast",
            WriteOptions {
                fast: true,
                ..WriteOptions::default()
            },
        )
    }

    /// Replace the layout options, keeping this formatter's fast flag.
    pub fn with_options(self, options: &WriteOptions) -> Self {
        let fast = self.options.fast;
        InpFormatter {
            options: WriteOptions {
                fast,
                ..options.clone()
            },
            ..self
        }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }
}

impl Formatter for InpFormatter {
    fn name(&self) -> &str {
        self.name
    }

    fn serialize(&self, doc: &Document) -> Result<String, SerializeError> {
        Ok(render_document(doc, &self.options))
    }

    fn description(&self) -> &str {
        if self.options.fast {
            "Project text, one line per record"
        } else {
            "Project text with aligned tables"
        }
    }
}

pub fn render_document(doc: &Document, options: &WriteOptions) -> String {
    let mut out = String::new();
    for (name, section) in doc.iter() {
        out.push('[');
        out.push_str(name);
        out.push_str("]\n");
        for line in section_lines(section, options) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Body lines of one section.
pub fn section_lines(section: &Section, options: &WriteOptions) -> Vec<String> {
    match section {
        Section::Title(text) => text.lines().map(str::to_string).collect(),
        Section::Settings(settings) => settings.lines(options.report_items_per_line),
        Section::Objects(container) => object_lines(container, options),
        Section::Raw(raw) => raw.lines.clone(),
    }
}

fn object_lines(container: &SectionContainer, options: &WriteOptions) -> Vec<String> {
    if container.is_empty() {
        return vec![NO_DATA.to_string()];
    }

    let schema = container.schema();
    if !options.fast && schema.table_export() {
        return container
            .to_table()
            .render(options.column_gap)
            .lines()
            .map(str::to_string)
            .collect();
    }

    let separate = schema.grouping().is_block();
    let mut lines = Vec::new();
    for (index, record) in container.iter().enumerate() {
        if separate && index > 0 {
            lines.push(String::new());
        }
        lines.extend(record.to_tokens().iter().map(|tokens| tokens.join(" ")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const COORDINATES: &str = "[COORDINATES]\nJ1 1 2\nJ10 100.5 20\n";

    #[test]
    fn test_table_write() {
        let doc = Document::read(COORDINATES).unwrap();
        let expected = [
            "[COORDINATES]",
            ";;Node  X      Y",
            "J1      1      2",
            "J10     100.5  20",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(doc.write(false), expected);
    }

    #[test]
    fn test_fast_write() {
        let doc = Document::read(COORDINATES).unwrap();
        assert_eq!(doc.write(true), "[COORDINATES]\nJ1 1 2\nJ10 100.5 20\n\n");
    }

    #[test]
    fn test_column_gap_option() {
        let doc = Document::read(COORDINATES).unwrap();
        let options = WriteOptions {
            column_gap: 1,
            ..WriteOptions::default()
        };
        assert!(doc.write_with(&options).contains("J10    100.5 20\n"));
    }

    #[test]
    fn test_empty_object_section() {
        let doc = Document::read("[CURVES]\n").unwrap();
        assert_eq!(doc.write(false), "[CURVES]\n;; No Data\n\n");
        assert_eq!(Document::read(&doc.write(false)).unwrap(), doc);
    }

    #[test]
    fn test_block_records_are_separated() {
        let text = "[CONTROLS]\nRULE R1\nIF A\nTHEN B\nRULE R2\nIF C\nTHEN D\n";
        let doc = Document::read(text).unwrap();
        assert_eq!(
            doc.write(false),
            "[CONTROLS]\nRULE R1\nIF A\nTHEN B\n\nRULE R2\nIF C\nTHEN D\n\n"
        );
    }

    #[test]
    fn test_formatter_keeps_fast_flag() {
        let options = WriteOptions {
            fast: false,
            column_gap: 4,
            report_items_per_line: 5,
        };
        let formatter = InpFormatter::fast().with_options(&options);
        assert!(formatter.options().fast);
        assert_eq!(formatter.options().column_gap, 4);
        assert_eq!(formatter.name(), "inp-fast");
    }
}
