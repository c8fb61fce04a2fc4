use thiserror::Error;

/// Errors emitted by the generation crate.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
