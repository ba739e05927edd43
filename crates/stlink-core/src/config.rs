//! Session configuration
//!
//! Settings are plain serde structs so front-ends can persist them as JSON.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::protocol::DEFAULT_TIMEOUT_MS;

/// Errors from loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Malformed JSON
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed but unusable values
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Probe session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Default timeout for each bulk transfer in milliseconds
    pub timeout_ms: u64,
    /// USB interface number to claim
    pub interface: u8,
    /// Let libusb detach a bound kernel driver while the interface is claimed
    pub detach_kernel_driver: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            interface: 0,
            detach_kernel_driver: true,
        }
    }
}

impl SessionConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings that would let a transfer block forever
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be non-zero".into()));
        }
        Ok(())
    }

    /// Default transfer timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
