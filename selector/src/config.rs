//! Environment-based configuration for the selector and its directory.
//!
//! # Example
//!
//! ```no_run
//! use region_selector::config::SelectorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SelectorConfig::from_env()?;
//! println!("Directory: {} ({})", config.directory.base_url, config.directory.layout);
//! # Ok(())
//! # }
//! ```

use crate::types::ConfirmPolicy;
use region_directory::DirectoryLayout;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Base URL of the IBGE localities API
pub const DEFAULT_DIRECTORY_URL: &str = "https://servicodados.ibge.gov.br/api/v1";

/// Screen the navigator is asked to open on confirm
pub const DEFAULT_NEXT_SCREEN: &str = "Points";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: usize = 3;

/// Environment variable names
pub mod vars {
    /// Directory base URL
    pub const DIRECTORY_URL: &str = "REGION_DIRECTORY_URL";
    /// Directory URL layout (`generic` or `ibge`)
    pub const DIRECTORY_LAYOUT: &str = "REGION_DIRECTORY_LAYOUT";
    /// Per-request timeout in seconds
    pub const DIRECTORY_TIMEOUT_SECS: &str = "REGION_DIRECTORY_TIMEOUT_SECS";
    /// Retries after the first failed attempt
    pub const DIRECTORY_MAX_RETRIES: &str = "REGION_DIRECTORY_MAX_RETRIES";
    /// `require-complete` or `forward-as-is`
    pub const CONFIRM_POLICY: &str = "REGION_SELECTOR_CONFIRM_POLICY";
    /// Screen id passed to the navigator
    pub const NEXT_SCREEN: &str = "REGION_SELECTOR_NEXT_SCREEN";
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable could not be parsed
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Directory connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the directory service
    pub base_url: String,
    /// URL layout the service speaks
    pub layout: DirectoryLayout,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: usize,
}

impl DirectoryConfig {
    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate directory settings
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty or not http(s), or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url cannot be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must use http or https: {url}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DIRECTORY_URL.to_string(),
            layout: DirectoryLayout::Ibge,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Complete selector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Directory connection
    pub directory: DirectoryConfig,
    /// Treatment of incomplete selections on confirm
    pub confirm_policy: ConfirmPolicy,
    /// Screen id passed to the navigator
    pub next_screen: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            confirm_policy: ConfirmPolicy::default(),
            next_screen: DEFAULT_NEXT_SCREEN.to_string(),
        }
    }
}

impl SelectorConfig {
    /// Load configuration from process environment variables
    ///
    /// Unset variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable cannot be parsed or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns error if a variable cannot be parsed or validation fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(vars::DIRECTORY_URL) {
            config.directory.base_url = url.trim().to_string();
        }

        if let Some(value) = lookup(vars::DIRECTORY_LAYOUT) {
            config.directory.layout =
                DirectoryLayout::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                    var: vars::DIRECTORY_LAYOUT,
                    value,
                })?;
        }

        if let Some(value) = lookup(vars::DIRECTORY_TIMEOUT_SECS) {
            config.directory.timeout_secs =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    var: vars::DIRECTORY_TIMEOUT_SECS,
                    value,
                })?;
        }

        if let Some(value) = lookup(vars::DIRECTORY_MAX_RETRIES) {
            config.directory.max_retries =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    var: vars::DIRECTORY_MAX_RETRIES,
                    value,
                })?;
        }

        if let Some(value) = lookup(vars::CONFIRM_POLICY) {
            config.confirm_policy =
                ConfirmPolicy::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                    var: vars::CONFIRM_POLICY,
                    value,
                })?;
        }

        if let Some(screen) = lookup(vars::NEXT_SCREEN) {
            config.next_screen = screen.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration
    ///
    /// # Errors
    ///
    /// Returns error if any section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.directory.validate()?;
        if self.next_screen.is_empty() {
            return Err(ConfigError::ValidationError(
                "next_screen cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
