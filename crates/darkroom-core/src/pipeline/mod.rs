//! Photo ingestion pipeline components.
//!
//! This module contains all the stages of the ingestion pipeline:
//! - **validate**: Size, allow-list and decode checks before any work
//! - **keys**: Collision-resistant, path-safe storage keys
//! - **metadata**: EXIF metadata extraction (never fails)
//! - **thumbnail**: Fit-within-box JPEG thumbnails
//! - **decode**: In-memory decoding shared by the stages above
//! - **hash**: Content hashing of originals
//! - **discovery**: Find uploadable files on disk
//! - **processor**: Orchestrates the full pipeline

pub mod decode;
pub mod discovery;
pub mod hash;
pub mod keys;
pub mod metadata;
pub mod processor;
pub mod thumbnail;
pub mod validate;

// Re-exports for convenient access
pub use decode::DecodedImage;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use hash::Hasher;
pub use keys::{KeyGenerator, StorageKeys};
pub use metadata::MetadataExtractor;
pub use processor::{IngestOptions, Stage, UploadPipeline};
pub use thumbnail::ThumbnailGenerator;
pub use validate::Validator;
