//! Application configuration with builder pattern.
//!
//! [`AppConfig`] controls where packages are extracted and how logs are
//! emitted. It is built with `bon` and validated at build time.
//!
//! # Example
//!
//! ```
//! use optiml::config::{AppConfig, LogFormat};
//!
//! // All defaults
//! let config = AppConfig::builder().build().unwrap();
//! assert_eq!(config.log_filter, "info");
//!
//! let config = AppConfig::builder()
//!     .log_filter("optiml=debug")
//!     .log_format(LogFormat::Json)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bon::Builder;

/// Environment variable for [`AppConfig::scratch_dir`].
pub const ENV_SCRATCH_DIR: &str = "OPTIML_SCRATCH_DIR";
/// Environment variable for [`AppConfig::log_filter`].
pub const ENV_LOG: &str = "OPTIML_LOG";
/// Environment variable for [`AppConfig::log_format`].
pub const ENV_LOG_FORMAT: &str = "OPTIML_LOG_FORMAT";

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The scratch directory does not exist.
    #[error("scratch directory {0} does not exist")]
    ScratchDirMissing(PathBuf),
    /// The scratch path exists but is not a directory.
    #[error("scratch path {0} is not a directory")]
    ScratchDirNotADirectory(PathBuf),
    /// Unknown log format name.
    #[error("unknown log format '{0}' (expected 'pretty' or 'json')")]
    InvalidLogFormat(String),
    /// Empty log filter directive.
    #[error("log filter must not be empty")]
    EmptyLogFilter,
}

// =============================================================================
// LogFormat
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable, one event per line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct AppConfig {
    /// Parent directory for package extraction. `None` uses the system
    /// temporary directory.
    #[builder(into)]
    pub scratch_dir: Option<PathBuf>,

    /// `tracing` filter directives. Default: `info`.
    #[builder(into, default = String::from("info"))]
    pub log_filter: String,

    /// Log output format. Default: pretty.
    #[builder(default)]
    pub log_format: LogFormat,
}

impl<S: app_config_builder::IsComplete> AppConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the scratch directory is not an existing
    /// directory or the log filter is blank.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl AppConfig {
    /// Configuration from `OPTIML_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        RawConfig::from_env().build()
    }

    /// Configuration from an arbitrary key lookup.
    ///
    /// Unset or empty values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        RawConfig::from_lookup(lookup).build()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.scratch_dir {
            if !dir.exists() {
                return Err(ConfigError::ScratchDirMissing(dir.clone()));
            }
            if !dir.is_dir() {
                return Err(ConfigError::ScratchDirNotADirectory(dir.clone()));
            }
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }

        Ok(())
    }
}

// =============================================================================
// RawConfig
// =============================================================================

/// Unvalidated configuration values, as read from the environment.
///
/// Callers layer their own values on top (e.g. command-line flags) and
/// validate once with [`RawConfig::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub scratch_dir: Option<PathBuf>,
    pub log_filter: Option<String>,
    pub log_format: Option<String>,
}

impl RawConfig {
    /// Values of the `OPTIML_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Values from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            scratch_dir: get(ENV_SCRATCH_DIR).map(PathBuf::from),
            log_filter: get(ENV_LOG),
            log_format: get(ENV_LOG_FORMAT),
        }
    }

    /// Parse and validate into an [`AppConfig`].
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let log_format = self
            .log_format
            .map(|v| v.parse::<LogFormat>())
            .transpose()?;

        AppConfig::builder()
            .maybe_scratch_dir(self.scratch_dir)
            .maybe_log_filter(self.log_filter)
            .maybe_log_format(log_format)
            .build()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            log_filter: String::from("info"),
            log_format: LogFormat::Pretty,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
