use std::time::Duration;

use serde::Serialize;

use salesgen_core::SalesEvent;
use salesgen_generate::encode_jsonl;

use crate::error::UploadError;
use crate::store::ObjectStore;

/// Record of one object written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub key: String,
    pub location: String,
    pub events: usize,
    pub bytes: usize,
}

/// Encode `events` as JSON Lines and write them to `key` in a single put.
///
/// The put is abandoned after `timeout`. No retry.
pub async fn upload_batch(
    store: &dyn ObjectStore,
    key: &str,
    events: &[SalesEvent],
    timeout: Duration,
) -> Result<UploadReceipt, UploadError> {
    let body = encode_jsonl(events).map_err(|source| UploadError::Encode {
        key: key.to_string(),
        source,
    })?;
    let bytes = body.len();

    match tokio::time::timeout(timeout, store.put(key, body)).await {
        Ok(Ok(())) => Ok(UploadReceipt {
            key: key.to_string(),
            location: store.location(key),
            events: events.len(),
            bytes,
        }),
        Ok(Err(source)) => Err(UploadError::Rejected {
            key: key.to_string(),
            source,
        }),
        Err(_) => Err(UploadError::TimedOut {
            key: key.to_string(),
            after: timeout,
        }),
    }
}
