//! Output formats for documents
//!
//! - `inp` / `inp-fast`: project text, as aligned tables or one line per record
//! - `json` / `yaml`: structured dumps, sections → records → field → value

pub mod inp;
pub mod registry;
pub mod structured;

pub use inp::InpFormatter;
pub use registry::{FormatRegistry, Formatter, SerializeError};
pub use structured::{JsonFormatter, YamlFormatter};
