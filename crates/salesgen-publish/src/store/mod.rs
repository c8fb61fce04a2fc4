mod local;
mod memory;
mod s3;

pub use local::LocalDirStore;
pub use memory::MemoryStore;
pub use s3::S3Store;

use async_trait::async_trait;
use thiserror::Error;

pub const JSONL_CONTENT_TYPE: &str = "application/x-ndjson";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Write capability for a single bucket or directory.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Display form of where `key` lands, e.g. `s3://bucket/key`.
    fn location(&self, key: &str) -> String;

    /// Create or overwrite the object at `key`.
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;
}

/// The store refused or failed a write.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
