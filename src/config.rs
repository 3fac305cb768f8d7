//! Configuration model for rulecast.
//!
//! This module defines the Config struct that represents `rulecast.yaml` at
//! the project root. It supports forward-compatible YAML parsing (unknown
//! fields are preserved), sensible defaults for optional fields, and
//! validation of config values.
//!
//! The `allow_commands` flag is the security gate for dynamic variables:
//! it defaults to false and must be set explicitly in the project
//! configuration before any declared command is executed.

use crate::error::{Result, RulecastError};
use crate::exec::DEFAULT_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Project configuration loaded from `rulecast.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inline variables, the lowest-precedence non-builtin layer.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,

    /// Security gate for dynamic (command) variables.
    pub allow_commands: bool,

    /// Timeout applied to each dynamic variable command.
    pub command_timeout_seconds: u64,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variables: BTreeMap::new(),
            allow_commands: false,
            command_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load config from a YAML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            RulecastError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| RulecastError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| RulecastError::UserError(format!("failed to serialize config: {}", e)))
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<()> {
        if self.command_timeout_seconds == 0 {
            return Err(RulecastError::UserError(
                "config validation failed: command_timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// The command timeout as a `Duration`.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}
