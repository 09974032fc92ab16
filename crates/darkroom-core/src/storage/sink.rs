//! Bucket-bound storage with timeouts, retry and best-effort deletes.

use std::sync::Arc;
use std::time::Duration;

use super::{public_url, retry, ObjectStore};
use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Uploads and deletes objects in one bucket through an injected backend.
#[derive(Clone)]
pub struct StorageSink {
    store: Arc<dyn ObjectStore>,
    config: StorageConfig,
}

impl StorageSink {
    pub fn new(store: Arc<dyn ObjectStore>, config: StorageConfig) -> Self {
        Self { store, config }
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.store.name()
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Public URL of an object in this bucket.
    pub fn cdn_url(&self, key: &str) -> String {
        public_url(&self.config, key)
    }

    /// Store an object, retrying transient failures under the same key.
    ///
    /// Each attempt is bounded by `put_timeout_ms`; backoff doubles from
    /// `retry_delay_ms`. Returns the last error once attempts run out or a
    /// non-retryable error is seen.
    pub async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        let timeout_ms = self.config.put_timeout_ms;
        let attempts = self.config.retry_attempts;

        let mut last_error = StorageError::Unavailable("no attempt made".to_string());
        for attempt in 0..=attempts {
            if attempt > 0 {
                let delay = retry::backoff_duration(attempt - 1, self.config.retry_delay_ms);
                tracing::debug!(key, "Retry {attempt}/{attempts} after {delay:?}");
                tokio::time::sleep(delay).await;
            }

            let put = self
                .store
                .put(&self.config.bucket, key, bytes, content_type);
            match tokio::time::timeout(Duration::from_millis(timeout_ms), put).await {
                Ok(Ok(())) => {
                    tracing::debug!(
                        backend = self.store.name(),
                        bucket = %self.config.bucket,
                        key,
                        size_bytes = bytes.len(),
                        "Stored object"
                    );
                    return Ok(());
                }
                Ok(Err(e)) => {
                    tracing::warn!(key, attempt, error = %e, "Storage put failed");
                    let retryable = retry::is_retryable(&e);
                    last_error = e;
                    if !retryable {
                        break;
                    }
                }
                Err(_) => {
                    tracing::warn!(key, attempt, timeout_ms, "Storage put timed out");
                    last_error = StorageError::Timeout { timeout_ms };
                }
            }
        }

        Err(last_error)
    }

    /// Delete an object. Failures are logged, never returned.
    ///
    /// Returns whether the backend confirmed the delete.
    pub async fn delete(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        match self.store.delete(&self.config.bucket, key).await {
            Ok(()) => {
                tracing::debug!(bucket = %self.config.bucket, key, "Deleted object");
                true
            }
            Err(e) => {
                tracing::warn!(
                    bucket = %self.config.bucket,
                    key,
                    error = %e,
                    "Failed to delete object; leaving it orphaned"
                );
                false
            }
        }
    }

    /// Delete both objects of a photo, skipping empty keys.
    ///
    /// Returns how many deletes the backend confirmed.
    pub async fn delete_photo(&self, original: &str, thumbnail: &str) -> usize {
        let mut deleted = 0;
        for key in [original, thumbnail] {
            if !key.is_empty() && self.delete(key).await {
                deleted += 1;
            }
        }
        deleted
    }
}

impl std::fmt::Debug for StorageSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSink")
            .field("backend", &self.store.name())
            .field("bucket", &self.config.bucket)
            .finish()
    }
}
