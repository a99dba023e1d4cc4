//! Crate-level error type.

use crate::config::ConfigError;
use crate::engine::PredictError;
use crate::form::FormError;
use crate::logging::LoggingError;
use crate::package::PackageError;

/// Any error surfaced to a user of the crate.
///
/// Each variant displays exactly the message of its cause, so the text can
/// be shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    /// An action that needs a model package was attempted before upload.
    #[error("Please upload a model package first.")]
    NoPackage,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias with [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
