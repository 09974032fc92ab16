//! Filesystem object store: `{root}/{bucket}/{key}`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::io::Write;
use tokio::fs;

use super::ObjectStore;
use crate::error::{StorageError, StorageResult};

/// Stores objects as files under a root directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`. Directories are created lazily on put.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert bucket and key to a filesystem path under the root.
    ///
    /// Rejects absolute keys, backslashes, `..` and `.` segments, empty
    /// segments and control characters, so the path can never leave the bucket.
    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.starts_with('.') {
            return Err(StorageError::InvalidKey(format!("bucket '{bucket}'")));
        }
        if key.is_empty()
            || key.starts_with('/')
            || key.contains('\\')
            || key.contains("..")
            || key.chars().any(|c| c.is_control())
            || key.split('/').any(|segment| segment.is_empty() || segment == ".")
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(bucket).join(relative))
    }
}

/// Write `bytes` to `tmp`, fsync, then rename over `target`.
///
/// The temp file is removed on any failure.
fn write_atomic(tmp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let result = (|| {
        let mut file = std::fs::File::create(tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(tmp, target)
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(tmp);
    }
    result
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start = std::time::Instant::now();

        // Write beside the target and rename so readers never see a partial object
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidKey(key.to_string()))?;
        let tmp_path = path.with_file_name(format!(
            ".{file_name}.{:016x}.tmp",
            rand::random::<u64>()
        ));

        // A dropped put future must not abandon the temp file mid-write
        let owned = bytes.to_vec();
        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || write_atomic(&tmp_path, &target, &owned))
            .await
            .map_err(|e| StorageError::Io(format!("write task failed: {e}")))?;
        written?;

        tracing::debug!(
            path = %path.display(),
            key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), key, "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
