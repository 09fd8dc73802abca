//! # swmm-inp
//!
//! Reader, editor and writer for SWMM-style `.inp` project files.
//!
//! A project file is a sequence of bracketed sections (`[JUNCTIONS]`, `[CURVES]`, ...).
//! Each known section is parsed into typed records held in an ordered, key-unique
//! container; unknown sections are kept verbatim so that a read/write cycle never
//! loses content.
//!
//! ```text
//! let doc = Document::read(&text)?;
//! let patterns = doc.objects("PATTERNS").unwrap();
//! let out = doc.write(false);
//! ```
//!
//! ## Testing
//!
//! See the [testing module](inp::testing) for the fluent document assertions used
//! throughout the test suite.

pub mod inp;

pub use inp::coercion::{infer, infer_checked, render, Value};
pub use inp::config::{InpConfig, Loader, WriteOptions};
pub use inp::document::{Document, RawSection, Reader, Section};
pub use inp::error::{
    CoercionWarning, FormatError, ParseError, SchemaError, SectionError, ValidationError,
};
pub use inp::formats::{FormatRegistry, Formatter, SerializeError};
pub use inp::record::{Field, Key, Record};
pub use inp::registry::{Handler, Registry};
pub use inp::schema::{Grouping, RecordType, Schema, TypedSchema};
pub use inp::section::{SectionContainer, Table};
pub use inp::settings::{SettingsKind, SettingsSection};
