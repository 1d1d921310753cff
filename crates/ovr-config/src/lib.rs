//! OVR Configuration
//!
//! Decides whether testable units are wrapped at all, and whether they insist
//! on an override. The decision is made once by the application from its
//! environment and handed to the constructors as a plain value; the unit
//! and scope crates never read the environment themselves.
//!
//! # Sources
//!
//! - [`OverridesConfig::from_env`]: process environment
//! - [`OverridesConfig::from_env_map`]: any key/value iterator
//! - [`OverridesConfig::from_toml_str`]: a TOML document
//!
//! Wrapping is enabled when any of these hold:
//!
//! | variable      | value  |
//! |---------------|--------|
//! | `OVR_ENABLED` | truthy |
//! | `STORYBOOK`   | `true` |
//! | `OVR_ENV`     | `test` |
//!
//! Variables whose name or value is not valid UTF-8 are skipped.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use serde::{Deserialize, Serialize};
use std::ffi::OsString;

/// Explicit opt-in flag
pub const ENV_ENABLED: &str = "OVR_ENABLED";
/// Set by component catalog tooling, only `true` enables
pub const ENV_STORYBOOK: &str = "STORYBOOK";
/// Application mode, `test` under test runners
pub const ENV_MODE: &str = "OVR_ENV";
/// Overrides the `required` default
pub const ENV_REQUIRED: &str = "OVR_REQUIRED";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML document could not be parsed
    #[error("invalid overrides config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Boolean flag with an unrecognized value
    #[error("invalid value '{value}' for {var} (expected true/false)")]
    InvalidFlag {
        /// Variable name
        var: String,
        /// Offending value
        value: String,
    },
}

/// Configuration for testable units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverridesConfig {
    /// Wrap units so scopes can override them
    pub enabled: bool,
    /// Fail invocations that resolve no substitute
    pub required: bool,
}

impl OverridesConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With enabled flag
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// With required flag
    #[inline]
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Read configuration from the process environment
    ///
    /// # Errors
    /// [`ConfigError::InvalidFlag`] if a boolean variable has an unrecognized value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(utf8_vars(std::env::vars_os()))
    }

    /// Like [`from_env`](Self::from_env), falling back to defaults on error
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_env().unwrap_or_else(|err| {
            tracing::warn!("{err}, using default overrides config");
            Self::default()
        })
    }

    /// Read configuration from key/value pairs
    ///
    /// # Errors
    /// [`ConfigError::InvalidFlag`] if a boolean variable has an unrecognized value.
    pub fn from_env_map<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                ENV_ENABLED => {
                    config.enabled |= parse_flag(key, value)?;
                }
                ENV_STORYBOOK => {
                    config.enabled |= value.trim().eq_ignore_ascii_case("true");
                }
                ENV_MODE => {
                    config.enabled |= value.trim().eq_ignore_ascii_case("test");
                }
                ENV_REQUIRED => {
                    config.required = parse_flag(key, value)?;
                }
                _ => {}
            }
        }
        tracing::debug!(enabled = config.enabled, required = config.required, "overrides config");
        Ok(config)
    }

    /// Parse configuration from TOML
    ///
    /// ```rust
    /// use ovr_config::OverridesConfig;
    ///
    /// let config = OverridesConfig::from_toml_str("enabled = true").unwrap();
    /// assert!(config.enabled);
    /// assert!(config.required);
    /// ```
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed input.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl Default for OverridesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            required: true,
        }
    }
}

fn utf8_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::debug!(key = ?key, "skipping non-UTF-8 environment variable");
                None
            }
        })
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
