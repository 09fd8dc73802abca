//! Error taxonomy for reading and editing project files
//!
//! Parsing is fail-fast: the first [`FormatError`] or [`SectionError`] aborts the
//! read and is returned as a [`ParseError`]. Coercion problems are never fatal,
//! they surface as a [`CoercionWarning`] and the token is kept as text.

use crate::inp::coercion::Value;
use std::fmt;

/// Structural problem in the raw text, found while splitting it into sections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line {}: section header `{text}` is missing its closing `]`", .line_index + 1)]
    UnterminatedHeader { line_index: usize, text: String },

    #[error("line {}: unexpected text after section header `{text}`", .line_index + 1)]
    MalformedHeader { line_index: usize, text: String },

    #[error("line {}: section header has no name", .line_index + 1)]
    EmptyHeader { line_index: usize },

    #[error("line {}, column {}: unexpected character", .line_index + 1, .column + 1)]
    UnexpectedCharacter { line_index: usize, column: usize },
}

/// A line group could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("too many tokens: expected at most {expected}, found {found}")]
    TooManyTokens { expected: usize, found: usize },

    #[error("`{token}` is not a valid value for `{field}`")]
    InvalidValue { field: String, token: String },

    #[error("unknown keyword `{0}`")]
    UnknownKeyword(String),

    #[error("`{token}` does not belong to any record")]
    OrphanLine { line_index: usize, token: String },

    #[error("`{0}` may only appear once per record")]
    DuplicateClause(String),

    #[error("only one of {0} may be given")]
    ConflictingEntries(String),

    #[error("{0}")]
    Malformed(String),
}

impl SchemaError {
    pub fn missing(field: impl Into<String>) -> Self {
        SchemaError::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, token: impl Into<String>) -> Self {
        SchemaError::InvalidValue {
            field: field.into(),
            token: token.into(),
        }
    }

    /// Line the error points at, when the error knows better than its record.
    pub fn line_index(&self) -> Option<usize> {
        match self {
            SchemaError::OrphanLine { line_index, .. } => Some(*line_index),
            _ => None,
        }
    }
}

/// A [`SchemaError`] positioned inside a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{section}] line {}: {source}", .line_index + 1)]
pub struct SectionError {
    pub section: String,
    pub line_index: usize,
    pub source: SchemaError,
}

impl SectionError {
    pub fn new(section: impl Into<String>, line_index: usize, source: SchemaError) -> Self {
        SectionError {
            section: section.into(),
            line_index,
            source,
        }
    }
}

/// Everything that can abort [`Document::read`](crate::inp::document::Document::read).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Schema(#[from] SectionError),
}

/// Caller misuse of the editing API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("`{field}` is not a field of {record}")]
    UnknownField { record: &'static str, field: String },

    #[error("{record}.{field} cannot hold {value:?}")]
    TypeMismatch {
        record: &'static str,
        field: String,
        value: Value,
    },

    #[error("section holds {expected} records, got {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("no record with key `{0}`")]
    UnknownKey(String),
}

/// Shape a token appeared to have before it failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    Integer,
    Float,
    Date,
    Time,
    Numeric,
}

impl fmt::Display for TokenShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenShape::Integer => "an integer",
            TokenShape::Float => "a float",
            TokenShape::Date => "a date",
            TokenShape::Time => "a time of day",
            TokenShape::Numeric => "a number",
        };
        f.write_str(name)
    }
}

/// Non-fatal: the token was kept as text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token `{token}` looks like {shape} but does not parse as one")]
pub struct CoercionWarning {
    pub token: String,
    pub shape: TokenShape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_error_display_is_one_based() {
        let err = SectionError::new("JUNCTIONS", 4, SchemaError::missing("Elevation"));
        assert_eq!(
            err.to_string(),
            "[JUNCTIONS] line 5: missing required field `Elevation`"
        );
    }

    #[test]
    fn test_orphan_line_carries_its_index() {
        let err = SchemaError::OrphanLine {
            line_index: 7,
            token: "AND".into(),
        };
        assert_eq!(err.line_index(), Some(7));
        assert_eq!(SchemaError::missing("Name").line_index(), None);
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: ParseError = FormatError::EmptyHeader { line_index: 0 }.into();
        assert_eq!(err.to_string(), "line 1: section header has no name");
    }
}
