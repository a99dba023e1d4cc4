//! Log subscriber installation.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary (or to a test that wants to see the events).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::{AppConfig, LogFormat};

/// Errors installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Install the global `tracing` subscriber described by `config`.
///
/// Events go to stderr so that stdout carries only user-facing output.
/// Fails if a global subscriber is already installed.
pub fn init(config: &AppConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.log_filter)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match config.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_rejected() {
        let config = AppConfig {
            log_filter: "optiml=loud".into(),
            ..AppConfig::default()
        };
        assert!(matches!(init(&config), Err(LoggingError::InvalidFilter(_))));
    }
}
