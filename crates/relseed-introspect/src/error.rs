use thiserror::Error;

/// Errors raised while loading or marshaling introspection rows.
#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error(transparent)]
    Core(#[from] relseed_core::Error),
    #[error("unknown engine: {0}")]
    UnknownEngine(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IntrospectError>;
