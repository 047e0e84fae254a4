// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! strict_none = true
//! max_depth = 128
//! bytes_alphabet = "url_safe"
//! shared_cache = true
//! ```

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::engine::GeneralPurpose;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Base64 alphabet used by the bytes rule. Both alphabets are padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BytesAlphabet {
    #[default]
    Standard,
    UrlSafe,
}

impl BytesAlphabet {
    pub(crate) fn engine(self) -> &'static GeneralPurpose {
        match self {
            Self::Standard => &STANDARD,
            Self::UrlSafe => &URL_SAFE,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerdeConfig {
    /// Reject non-null wire values for the `None` rule instead of ignoring them.
    #[serde(default)]
    pub strict_none: bool,

    /// Maximum nesting of normalization and graph construction.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Base64 alphabet for byte blobs.
    #[serde(default)]
    pub bytes_alphabet: BytesAlphabet,

    /// Keep built converters in an engine-wide cache shared across builds.
    #[serde(default)]
    pub shared_cache: bool,
}

fn default_max_depth() -> usize {
    256
}

impl Default for SerdeConfig {
    fn default() -> Self {
        Self {
            strict_none: false,
            max_depth: default_max_depth(),
            bytes_alphabet: BytesAlphabet::Standard,
            shared_cache: false,
        }
    }
}

impl SerdeConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SerdeConfig::default();
        assert!(!config.strict_none);
        assert!(!config.shared_cache);
        assert_eq!(config.max_depth, 256);
        assert_eq!(config.bytes_alphabet, BytesAlphabet::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SerdeConfig::from_toml_str("strict_none = true").expect("parse");
        assert!(config.strict_none);
        assert_eq!(config.max_depth, 256);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "max_depth = 32\nbytes_alphabet = \"url_safe\"\nshared_cache = true")
            .expect("write");
        let config = SerdeConfig::from_file(file.path()).expect("load");
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.bytes_alphabet, BytesAlphabet::UrlSafe);
        assert!(config.shared_cache);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = SerdeConfig::from_toml_str("max_depth = 0").expect_err("invalid");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SerdeConfig::from_file("/nonexistent/typeserde.toml").expect_err("missing");
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
