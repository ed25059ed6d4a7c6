//! Configuration Module - Header runtime parameters
//!
//! Selects the header layout and the optional safety checks around the
//! header write. Defaults match the standard layout with checks off.

use crate::layout::{HeaderLayout, LayoutError};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};

/// Main configuration for header construction and mutation
///
/// # Examples
///
/// ```rust
/// use objhdr::{HeaderConfig, HeaderLayout};
///
/// let config = HeaderConfig {
///     layout: HeaderLayout::COMPACT,
///     verify_writes: true,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Bit layout of the header word
    ///
    /// Must match the host runtime exactly.
    /// Default: `HeaderLayout::STANDARD`
    pub layout: HeaderLayout,

    /// Decode and check the kind of every header word before it is stamped
    ///
    /// Catches caller bugs at the mutation boundary at the cost of a decode
    /// on the allocation path.
    /// Default: on in debug builds, off in release builds
    pub verify_writes: bool,

    /// Record header events in the global [`HeaderLogger`](crate::logging::HeaderLogger)
    ///
    /// Default: false
    pub log_events: bool,

    /// Minimum level of recorded events
    ///
    /// Default: `LogLevel::Warn`
    pub log_level: LogLevel,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            layout: HeaderLayout::STANDARD,
            verify_writes: cfg!(debug_assertions),
            log_events: false,
            log_level: LogLevel::Warn,
        }
    }
}

impl HeaderConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with:
    /// - OBJHDR_LAYOUT (`standard` | `compact`)
    /// - OBJHDR_VERIFY_WRITES
    /// - OBJHDR_LOG_EVENTS
    /// - OBJHDR_LOG_LEVEL (`error` | `warn` | `info` | `debug` | `trace`)
    ///
    /// # Examples
    ///
    /// ```bash
    /// export OBJHDR_LAYOUT=compact
    /// export OBJHDR_VERIFY_WRITES=1
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`HeaderConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("OBJHDR_LAYOUT") {
            config.layout =
                HeaderLayout::from_preset(&val).ok_or(ConfigError::UnknownPreset(val))?;
        }

        if let Some(val) = lookup("OBJHDR_VERIFY_WRITES") {
            config.verify_writes = parse_flag("OBJHDR_VERIFY_WRITES", &val)?;
        }

        if let Some(val) = lookup("OBJHDR_LOG_EVENTS") {
            config.log_events = parse_flag("OBJHDR_LOG_EVENTS", &val)?;
        }

        if let Some(val) = lookup("OBJHDR_LOG_LEVEL") {
            config.log_level = LogLevel::from_name(&val).ok_or_else(|| ConfigError::InvalidValue {
                key: "OBJHDR_LOG_LEVEL",
                value: val,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid header layout: {0}")]
    InvalidLayout(#[from] LayoutError),

    #[error("Unknown layout preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
