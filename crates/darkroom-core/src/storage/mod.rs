//! Object storage for originals and thumbnails.
//!
//! The pipeline only knows the [`ObjectStore`] contract. Backends are injected
//! as `Arc<dyn ObjectStore>` and wrapped in a [`StorageSink`], which adds the
//! bucket, per-put timeouts, retry and best-effort deletes.

mod local;
mod memory;
pub mod retry;
mod sink;
mod url;

pub use local::LocalObjectStore;
pub use memory::{MemoryObjectStore, StoredObject};
pub use sink::StorageSink;
pub use url::{public_url, resolve_env_var};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::error::StorageResult;

/// Trait that all object store backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the sink holds an `Arc<dyn ObjectStore>`).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logging (e.g. "local", "memory").
    fn name(&self) -> &str;

    /// Store `bytes` under `key`, overwriting any existing object.
    ///
    /// A put either fully succeeds or leaves no readable object behind.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> StorageResult<()>;

    /// Remove the object at `key`. Deleting a missing object succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;
}

/// Create the backend selected by `storage.backend`.
pub fn create_store(config: &Config) -> Arc<dyn ObjectStore> {
    match config.storage.backend {
        StorageBackend::Local => Arc::new(LocalObjectStore::new(config.storage_root())),
        StorageBackend::Memory => Arc::new(MemoryObjectStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_store_by_backend() {
        let mut config = Config::default();
        assert_eq!(create_store(&config).name(), "local");

        config.storage.backend = StorageBackend::Memory;
        assert_eq!(create_store(&config).name(), "memory");
    }
}
