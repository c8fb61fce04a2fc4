use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use super::{JSONL_CONTENT_TYPE, ObjectStore, StoreError};

/// Amazon S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the default credential chain for `region`.
    pub async fn connect(region: &str, bucket: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config), bucket)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let bytes = body.len();
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(JSONL_CONTENT_TYPE)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| {
                StoreError::with_source(
                    format!(
                        "put_object to {} failed: {}",
                        self.location(key),
                        DisplayErrorContext(&err)
                    ),
                    err,
                )
            })?;

        debug!(
            bucket = %self.bucket,
            key,
            bytes,
            etag = output.e_tag().unwrap_or_default(),
            "put_object succeeded"
        );
        Ok(())
    }
}
