//! Engine configuration (`dynbind.toml`)
//!
//! ```toml
//! [build]
//! resolve_forward_references = true
//!
//! [dispatch]
//! overload_policy = "arity-then-kind"
//!
//! [export]
//! pretty = false
//! exclude_categories = ["Internal"]
//! ```
//!
//! Every section and field is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::BuildOptions;
use crate::dispatch::{DispatchOptions, OverloadPolicy};
use crate::export::ExportConfig;

/// Environment variable overriding the overload policy
pub const OVERLOAD_POLICY_ENV: &str = "DYNBIND_OVERLOAD_POLICY";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to encode TOML
    #[error("Failed to encode config: {0}")]
    EncodeError(#[from] toml::ser::Error),

    /// Invalid environment override
    #[error("Invalid value for {var}: {message}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// What was wrong
        message: String,
    },
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Catalog build options
    pub build: BuildOptions,
    /// Dispatcher options
    pub dispatch: DispatchOptions,
    /// Export options
    pub export: ExportConfig,
}

impl EngineConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a config string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Write the config as TOML
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup(OVERLOAD_POLICY_ENV) {
            self.dispatch.overload_policy = value
                .parse::<OverloadPolicy>()
                .map_err(|message| ConfigError::InvalidEnv {
                    var: OVERLOAD_POLICY_ENV,
                    message,
                })?;
        }
        Ok(())
    }
}
