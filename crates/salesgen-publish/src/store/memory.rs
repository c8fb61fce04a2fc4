use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{ObjectStore, StoreError};

/// In-process store that records every write. Can be told to fail or stall.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    attempts: AtomicUsize,
    fail_from_attempt: Option<usize>,
    delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every put from the `attempt`-th one (1-based) onwards.
    pub fn failing_from(mut self, attempt: usize) -> Self {
        self.fail_from_attempt = Some(attempt);
        self
    }

    /// Sleep for `delay` before completing each put.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn location(&self, key: &str) -> String {
        format!("memory://{key}")
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self
            .fail_from_attempt
            .is_some_and(|fail_from| attempt >= fail_from)
        {
            return Err(StoreError::new(format!(
                "access denied writing {}",
                self.location(key)
            )));
        }

        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StoreError::new("failed to lock memory store"))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }
}
