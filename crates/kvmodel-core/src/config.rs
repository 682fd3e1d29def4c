use crate::{error::InternalError, kv::Consistency, kv::DEFAULT_BATCH_SIZE};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),

    #[error("invalid config value for '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::config_unsupported(err.to_string())
    }
}

///
/// ModelConfig
///
/// Runtime policy for a `Db` handle. Every field has a default, so an empty
/// document is a valid config.
///
/// ```toml
/// consistency = "eventual"
/// scan_batch_size = 256
/// create_attempts = 5
/// debug = true
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Read consistency used when the caller does not pick one.
    #[serde(default)]
    pub consistency: Consistency,

    /// Keys fetched per round trip by `find_all` and integrity scans.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,

    /// Fresh ids tried by `create` before an id collision is surfaced.
    #[serde(default = "default_create_attempts")]
    pub create_attempts: u32,

    /// Emit a debug event per operation.
    #[serde(default)]
    pub debug: bool,
}

const fn default_scan_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

const fn default_create_attempts() -> u32 {
    3
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            consistency: Consistency::default(),
            scan_batch_size: default_scan_batch_size(),
            create_attempts: default_create_attempts(),
            debug: false,
        }
    }
}

impl ModelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "scan_batch_size",
                reason: "must be greater than zero",
            });
        }
        if self.create_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "create_attempts",
                reason: "must be greater than zero",
            });
        }

        Ok(())
    }

    #[must_use]
    pub const fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    #[must_use]
    pub const fn with_scan_batch_size(mut self, scan_batch_size: usize) -> Self {
        self.scan_batch_size = scan_batch_size;
        self
    }

    #[must_use]
    pub const fn with_create_attempts(mut self, create_attempts: u32) -> Self {
        self.create_attempts = create_attempts;
        self
    }

    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

///
/// TESTS
///
