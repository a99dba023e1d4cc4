//! Errors raised while reading or writing persisted models.

/// Error reading a persisted model.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("unknown model type '{0}'")]
    UnknownModelType(String),

    #[error("invalid model: {0}")]
    Validation(String),
}

/// Error writing a model.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write model: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode model JSON: {0}")]
    Json(#[from] serde_json::Error),
}
