//! Pipeline orchestration - wires together all ingestion stages.
//!
//! ```text
//! Received → Validated → KeyGenerated → Processed (metadata ∥ thumbnail)
//!          → OriginalUploaded → ThumbnailUploaded → Complete
//! ```
//!
//! Nothing is written to storage until every CPU-bound stage has succeeded.
//! Cancellation and the caller's deadline only apply up to that point; once
//! the first put starts, the upload runs to completion or rolls back.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::{Config, LimitsConfig};
use crate::error::{InvalidUpload, ObjectRole, PipelineError, PipelineResult};
use crate::storage::{ObjectStore, StorageSink};
use crate::types::{ImageMetadata, Thumbnail, UploadRequest, UploadResult};

use super::hash::Hasher;
use super::keys::{KeyGenerator, StorageKeys};
use super::metadata::MetadataExtractor;
use super::thumbnail::ThumbnailGenerator;
use super::validate::Validator;

/// States an upload moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Stage {
    Received = 0,
    Validated = 1,
    KeyGenerated = 2,
    /// Metadata extracted and thumbnail generated
    Processed = 3,
    OriginalUploaded = 4,
    ThumbnailUploaded = 5,
    Complete = 6,
}

impl Stage {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Stage::Received,
            1 => Stage::Validated,
            2 => Stage::KeyGenerated,
            3 => Stage::Processed,
            4 => Stage::OriginalUploaded,
            5 => Stage::ThumbnailUploaded,
            _ => Stage::Complete,
        }
    }

    /// Name of the work that moves an upload out of this state.
    pub fn step(self) -> &'static str {
        match self {
            Stage::Received => "validate",
            Stage::Validated => "key_generation",
            Stage::KeyGenerated => "metadata_thumbnail",
            Stage::Processed => "original_upload",
            Stage::OriginalUploaded => "thumbnail_upload",
            Stage::ThumbnailUploaded | Stage::Complete => "complete",
        }
    }

    /// True while no storage write has started.
    pub fn is_pre_write(self) -> bool {
        self <= Stage::Processed
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::KeyGenerated => "key_generated",
            Stage::Processed => "processed",
            Stage::OriginalUploaded => "original_uploaded",
            Stage::ThumbnailUploaded => "thumbnail_uploaded",
            Stage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Current stage of one upload, readable while the pre-write phase is
/// being raced against cancellation.
struct StageTracker(AtomicU8);

impl StageTracker {
    fn new() -> Self {
        Self(AtomicU8::new(Stage::Received as u8))
    }

    fn get(&self) -> Stage {
        Stage::from_u8(self.0.load(Ordering::SeqCst))
    }

    fn set(&self, stage: Stage) {
        self.0.store(stage as u8, Ordering::SeqCst);
        tracing::trace!(%stage, "Stage reached");
    }
}

/// Options for controlling a single ingestion.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Abort the upload if cancelled before the first storage write
    pub cancel: Option<CancellationToken>,
    /// Deadline for everything before the first storage write
    pub timeout: Option<Duration>,
}

impl IngestOptions {
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Everything computed before storage is touched.
struct Prepared {
    keys: StorageKeys,
    metadata: ImageMetadata,
    thumbnail: Thumbnail,
    content_hash: String,
}

/// The upload pipeline that orchestrates validation, processing and storage.
///
/// Holds no per-upload state; one instance serves any number of concurrent
/// uploads.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    validator: Validator,
    keys: KeyGenerator,
    thumbnails: ThumbnailGenerator,
    sink: StorageSink,
    limits: LimitsConfig,
}

impl UploadPipeline {
    /// Create a pipeline with the given configuration and storage backend.
    pub fn new(config: &Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            validator: Validator::new(config.limits.clone(), config.upload.clone()),
            keys: KeyGenerator::new(config.upload.clone(), config.storage.layout),
            thumbnails: ThumbnailGenerator::new(config.thumbnail.clone()),
            sink: StorageSink::new(store, config.storage.clone()),
            limits: config.limits.clone(),
        }
    }

    /// The storage sink uploads are written through.
    pub fn sink(&self) -> &StorageSink {
        &self.sink
    }

    /// Run one upload through the full pipeline.
    ///
    /// On success both objects are stored. On failure nothing is left in
    /// storage except when a rollback delete itself fails (logged).
    pub async fn ingest(
        &self,
        request: UploadRequest,
        options: &IngestOptions,
    ) -> PipelineResult<UploadResult> {
        let span = tracing::info_span!(
            "ingest",
            file_name = %request.file_name,
            album_id = %request.album_id,
            size = request.size(),
        );

        async {
            let start = Instant::now();
            let result = self.run(&request, options).await;
            match &result {
                Ok(done) => tracing::info!(
                    key = %done.file_path,
                    thumbnail = %done.thumbnail_path,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Photo ingested"
                ),
                Err(
                    e @ (PipelineError::InvalidUpload { .. }
                    | PipelineError::UnsupportedExtension { .. }
                    | PipelineError::Cancelled { .. }),
                ) => tracing::warn!(error = %e, "Upload rejected"),
                Err(e) => tracing::error!(error = %e, "Upload failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Delete both objects of a stored photo. Best effort, never fails.
    pub async fn delete(&self, original: &str, thumbnail: &str) -> usize {
        self.sink.delete_photo(original, thumbnail).await
    }

    async fn run(
        &self,
        request: &UploadRequest,
        options: &IngestOptions,
    ) -> PipelineResult<UploadResult> {
        let progress = StageTracker::new();

        let prepared = self.prepare_bounded(request, options, &progress).await?;

        // Last chance to abort without side effects
        if let Some(token) = &options.cancel {
            if token.is_cancelled() {
                return Err(PipelineError::Cancelled {
                    stage: progress.get().step().to_string(),
                });
            }
        }

        let Prepared {
            keys,
            metadata,
            thumbnail,
            content_hash,
        } = prepared;
        let content_type = normalize_content_type(&request.content_type);

        self.sink
            .put(&keys.original, &request.bytes, &content_type)
            .await
            .map_err(|source| PipelineError::StorageUpload {
                role: ObjectRole::Original,
                key: keys.original.clone(),
                source,
            })?;
        progress.set(Stage::OriginalUploaded);

        if let Err(source) = self
            .sink
            .put(&keys.thumbnail, &thumbnail.bytes, Thumbnail::CONTENT_TYPE)
            .await
        {
            // Never leave an original without its thumbnail. A timed-out
            // thumbnail put may still have landed, so remove both keys.
            tracing::warn!(key = %keys.original, "Thumbnail upload failed; rolling back");
            self.sink.delete_photo(&keys.original, &keys.thumbnail).await;
            return Err(PipelineError::StorageUpload {
                role: ObjectRole::Thumbnail,
                key: keys.thumbnail,
                source,
            });
        }
        progress.set(Stage::ThumbnailUploaded);

        let result = UploadResult {
            url: self.sink.cdn_url(&keys.original),
            thumbnail_url: self.sink.cdn_url(&keys.thumbnail),
            file_path: keys.original,
            thumbnail_path: keys.thumbnail,
            file_name: keys.file_name,
            file_size: request.size(),
            content_type,
            content_hash,
            thumbnail_width: thumbnail.width,
            thumbnail_height: thumbnail.height,
            metadata,
        };
        progress.set(Stage::Complete);
        Ok(result)
    }

    /// Run the pre-write phase under the caller's deadline and cancellation.
    async fn prepare_bounded(
        &self,
        request: &UploadRequest,
        options: &IngestOptions,
        progress: &StageTracker,
    ) -> PipelineResult<Prepared> {
        let bounded = async {
            let work = self.prepare(request, progress);
            match options.timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(result) => result,
                    Err(_) => Err(PipelineError::Timeout {
                        stage: progress.get().step().to_string(),
                        timeout_ms: limit.as_millis() as u64,
                    }),
                },
                None => work.await,
            }
        };

        match &options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(PipelineError::Cancelled {
                        stage: progress.get().step().to_string(),
                    }),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }

    async fn prepare(
        &self,
        request: &UploadRequest,
        progress: &StageTracker,
    ) -> PipelineResult<Prepared> {
        let invalid = |reason| PipelineError::InvalidUpload {
            file_name: request.file_name.clone(),
            reason,
        };

        // Cheap checks first: oversized or disallowed uploads never reach a decoder
        self.validator
            .check_cheap(&request.bytes, &request.file_name, &request.content_type)
            .map_err(invalid)?;

        let validator = self.validator.clone();
        let bytes = request.bytes.clone();
        let file_name = request.file_name.clone();
        let content_type = request.content_type.clone();
        let (decoded, content_hash) = run_blocking(
            Stage::Received.step(),
            Duration::from_millis(self.limits.decode_timeout_ms),
            move || -> Result<_, InvalidUpload> {
                let decoded = validator.validate(&bytes, &file_name, &content_type)?;
                Ok((decoded, Hasher::content_hash_from_bytes(&bytes)))
            },
        )
        .await?
        .map_err(invalid)?;
        progress.set(Stage::Validated);
        tracing::debug!(
            width = decoded.width,
            height = decoded.height,
            "Upload validated"
        );

        let keys = self.keys.generate(&request.file_name, &request.album_id)?;
        progress.set(Stage::KeyGenerated);

        let stage_timeout = Duration::from_millis(self.limits.thumbnail_timeout_ms);
        let bytes = request.bytes.clone();
        let metadata_task = run_blocking(Stage::KeyGenerated.step(), stage_timeout, move || {
            MetadataExtractor::extract(&bytes)
        });
        let generator = self.thumbnails.clone();
        let thumbnail_task = run_blocking(Stage::KeyGenerated.step(), stage_timeout, move || {
            generator.generate(&decoded.image)
        });
        let (metadata, thumbnail) = tokio::join!(metadata_task, thumbnail_task);

        let mut metadata = metadata.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Metadata extraction did not finish; continuing without it");
            ImageMetadata::default()
        });
        if metadata.location.is_none() {
            metadata.location = request
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from);
        }
        let thumbnail = thumbnail??;
        progress.set(Stage::Processed);

        Ok(Prepared {
            keys,
            metadata,
            thumbnail,
            content_hash,
        })
    }
}

/// Run CPU-bound work on the blocking pool with a timeout.
async fn run_blocking<T, F>(step: &'static str, timeout: Duration, f: F) -> PipelineResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(PipelineError::Internal {
            stage: step.to_string(),
            message: format!("Task panicked: {e}"),
        }),
        Err(_) => Err(PipelineError::Timeout {
            stage: step.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

/// Lower-cased MIME essence, parameters stripped.
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}
