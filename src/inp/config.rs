//! Configuration loading
//!
//! `defaults/inp.default.toml` is embedded into the crate so the documented
//! defaults and runtime behavior stay in sync. User files and single-key
//! overrides are layered on top through [`Loader`] before deserializing into
//! [`InpConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/inp.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct InpConfig {
    pub write: WriteOptions,
    pub logging: LoggingConfig,
}

/// Layout knobs for writing project text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteOptions {
    /// One line per record instead of aligned tables.
    pub fast: bool,
    pub column_gap: usize,
    /// REPORT lists longer than this wrap onto repeated lines.
    pub report_items_per_line: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            fast: false,
            column_gap: 2,
            report_items_per_line: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter used when `RUST_LOG` is unset.
    pub filter: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<InpConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<InpConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_write_options_default() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.write, WriteOptions::default());
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_overrides() {
        let config = Loader::new()
            .set_override("write.fast", true)
            .expect("override to apply")
            .set_override("write.column_gap", 4_i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.write.fast);
        assert_eq!(config.write.column_gap, 4);
        assert_eq!(config.write.report_items_per_line, 20);
    }

    #[test]
    fn test_optional_file_may_be_absent() {
        let config = Loader::new()
            .with_optional_file("does-not-exist.toml")
            .build()
            .expect("config to build");
        assert!(!config.write.fast);
    }

    #[test]
    fn test_required_file_must_exist() {
        assert!(Loader::new().with_file("does-not-exist.toml").build().is_err());
    }
}
