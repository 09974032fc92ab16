//! In-process object store for dry runs and tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::ObjectStore;
use crate::error::{StorageError, StorageResult};

/// An object held by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct Failures {
    /// Errors returned by the next puts, in order
    next_puts: VecDeque<StorageError>,
    /// Every put whose key contains the pattern fails with the error
    put_patterns: Vec<(String, StorageError)>,
    /// Every delete fails with the error
    deletes: Option<StorageError>,
}

/// Keeps objects in a map keyed by `(bucket, key)`.
///
/// Counts every put and delete call (including failed ones) and can be told
/// to fail or stall, which is how the pipeline's failure paths are exercised.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    failures: Mutex<Failures>,
    put_delay: Mutex<Option<Duration>>,
    put_calls: AtomicU32,
    delete_calls: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` puts with `error`, then behave normally.
    pub fn fail_next_puts(&self, count: usize, error: StorageError) {
        let mut failures = lock(&self.failures);
        failures
            .next_puts
            .extend(std::iter::repeat(error).take(count));
    }

    /// Fail every put whose key contains `pattern`.
    pub fn fail_puts_containing(&self, pattern: impl Into<String>, error: StorageError) {
        lock(&self.failures)
            .put_patterns
            .push((pattern.into(), error));
    }

    /// Fail every delete with `error`.
    pub fn fail_deletes(&self, error: StorageError) {
        lock(&self.failures).deletes = Some(error);
    }

    /// Sleep before completing each put.
    pub fn set_put_delay(&self, delay: Duration) {
        *lock(&self.put_delay) = Some(delay);
    }

    pub fn put_count(&self) -> u32 {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        lock(&self.objects).contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Number of stored objects across all buckets.
    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted keys stored in `bucket`.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.objects)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    fn injected_put_failure(&self, key: &str) -> Option<StorageError> {
        let mut failures = lock(&self.failures);
        if let Some(err) = failures.next_puts.pop_front() {
            return Some(err);
        }
        failures
            .put_patterns
            .iter()
            .find(|(pattern, _)| key.contains(pattern.as_str()))
            .map(|(_, err)| err.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *lock(&self.put_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.injected_put_failure(key) {
            return Err(err);
        }

        lock(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = lock(&self.failures).deletes.clone() {
            return Err(err);
        }

        lock(&self.objects).remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}
