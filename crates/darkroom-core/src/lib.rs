//! Darkroom Core - photo ingestion library.
//!
//! Darkroom takes the raw bytes of an uploaded photo and turns them into a
//! stored original, a stored thumbnail and a structured result record ready to
//! be persisted by the caller.
//!
//! # Architecture
//!
//! ```text
//! bytes → Validate → Key → (Metadata ∥ Thumbnail) → Store original → Store thumbnail → UploadResult
//! ```
//!
//! The core holds no database or HTTP dependencies. Storage backends are
//! injected through the [`storage::ObjectStore`] trait.
//!
//! # Usage
//!
//! ```rust,ignore
//! use darkroom_core::{create_store, Config, IngestOptions, UploadPipeline, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> darkroom_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = UploadPipeline::new(&config, create_store(&config));
//!
//!     let bytes = std::fs::read("./holiday.jpg")?;
//!     let request = UploadRequest::new(bytes, "holiday.jpg", "image/jpeg", "album-1");
//!     let result = pipeline.ingest(request, &IngestOptions::default()).await?;
//!     println!("Stored {} ({}x{} thumbnail)", result.file_path, result.thumbnail_width, result.thumbnail_height);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, DarkroomError, InvalidUpload, ObjectRole, PipelineError, PipelineResult, Result,
    StorageError, StorageResult, USER_UPLOAD_FAILED,
};
pub use output::{IngestOutcome, OutputFormat, OutputWriter};
pub use pipeline::{IngestOptions, Stage, StorageKeys, UploadPipeline};
pub use storage::{create_store, ObjectStore, StorageSink};
pub use types::{ImageMetadata, Thumbnail, UploadRequest, UploadResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
