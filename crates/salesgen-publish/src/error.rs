use std::path::PathBuf;
use std::time::Duration;

use salesgen_generate::GenerationError;
use thiserror::Error;

use crate::store::StoreError;

/// Settings that are missing or unusable. Raised before any generation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {key}")]
    Missing { key: &'static str },
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// A batch could not be written to the object store.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed upload to {key}: {source}")]
    Rejected { key: String, source: StoreError },
    #[error("upload to {key} timed out after {after:?}")]
    TimedOut { key: String, after: Duration },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        source: GenerationError,
    },
}

impl UploadError {
    pub fn key(&self) -> &str {
        match self {
            UploadError::Rejected { key, .. }
            | UploadError::TimedOut { key, .. }
            | UploadError::Encode { key, .. } => key,
        }
    }
}

/// Errors that abort a publishing run.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
    #[error("failed to write console output: {0}")]
    Console(#[source] std::io::Error),
}
