use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Ways resolving today's market and its outcome tokens can fail.
/// Each one is fatal to a single asset's cycle only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unrecognised catalog response: {0}")]
    AmbiguousSchema(String),

    #[error("fewer than two token ids: {0}")]
    InsufficientTokens(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
