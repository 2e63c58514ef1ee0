//! Session configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{ConfigError, DEFAULT_NONCE_LEN, DEFAULT_TAG_LEN, MAX_BUFFER_SIZE};

/// Largest tag length any supported primitive produces
const MAX_TAG_LEN: usize = 16;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ceiling on bytes buffered per epoch, and on finalized output
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
    /// Tag length callers are expected to pass to `init`
    #[serde(default = "default_tag_len")]
    pub default_tag_len: usize,
    /// Nonce length callers are expected to generate
    #[serde(default = "default_nonce_len")]
    pub default_nonce_len: usize,
}

// Default values

fn default_max_buffer_size() -> usize {
    MAX_BUFFER_SIZE
}

fn default_tag_len() -> usize {
    DEFAULT_TAG_LEN
}

fn default_nonce_len() -> usize {
    DEFAULT_NONCE_LEN
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: default_max_buffer_size(),
            default_tag_len: default_tag_len(),
            default_nonce_len: default_nonce_len(),
        }
    }
}

impl SessionConfig {
    /// Config with a custom buffer ceiling.
    #[must_use]
    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML and
    /// `ConfigError::Invalid` if a value is out of range.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "max_buffer_size must be greater than zero".to_string(),
            ));
        }

        if self.default_tag_len == 0 || self.default_tag_len > MAX_TAG_LEN {
            return Err(ConfigError::Invalid(format!(
                "default_tag_len must be between 1 and {MAX_TAG_LEN}, got {}",
                self.default_tag_len
            )));
        }

        if self.default_nonce_len == 0 {
            return Err(ConfigError::Invalid(
                "default_nonce_len must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
