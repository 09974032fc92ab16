//! Core data types for the Darkroom ingestion pipeline.
//!
//! An [`UploadRequest`] goes in, an [`UploadResult`] comes out. Nothing here
//! outlives a single invocation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single photo upload handed over by the HTTP layer.
///
/// The bytes are buffered once and shared; every decode re-slices the same
/// buffer, which is safe given the enforced size ceiling.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Raw uploaded bytes
    pub bytes: Arc<[u8]>,

    /// File name as declared by the client
    pub file_name: String,

    /// Content type as declared by the client
    pub content_type: String,

    /// Opaque album correlation id
    pub album_id: String,

    /// Optional caller-supplied location, used when EXIF has no GPS fix
    pub location: Option<String>,
}

impl UploadRequest {
    /// Build a request from owned bytes.
    pub fn new(
        bytes: impl Into<Arc<[u8]>>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        album_id: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            album_id: album_id.into(),
            location: None,
        }
    }

    /// Attach a caller-supplied location string.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Size of the upload in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Metadata derived from an uploaded image.
///
/// Every field is independently optional: a corrupt or metadata-less image
/// still yields a valid, mostly-empty record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Image width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Image height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Detected container format ("jpeg", "png", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Capture time from DateTimeOriginal, falling back to DateTime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_taken: Option<NaiveDateTime>,

    /// Camera model from IFD0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_model: Option<String>,

    /// Aperture as an f-number (e.g. 2.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,

    /// Exposure time, "N s" or "1/M s"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutter_speed: Option<String>,

    /// ISO sensitivity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,

    /// Focal length in millimeters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,

    /// GPS fix formatted as "lat, lon" with six decimals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ImageMetadata {
    /// True when at least one EXIF-derived field is present.
    pub fn has_exif(&self) -> bool {
        self.date_taken.is_some()
            || self.camera_model.is_some()
            || self.aperture.is_some()
            || self.shutter_speed.is_some()
            || self.iso.is_some()
            || self.focal_length.is_some()
            || self.location.is_some()
    }
}

/// An encoded thumbnail.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Encoded JPEG bytes
    pub bytes: Vec<u8>,
    /// Thumbnail width in pixels
    pub width: u32,
    /// Thumbnail height in pixels
    pub height: u32,
}

impl Thumbnail {
    /// Content type of every generated thumbnail.
    pub const CONTENT_TYPE: &'static str = "image/jpeg";
}

/// The outcome of a successful upload, handed to the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    /// Storage key of the original
    pub file_path: String,

    /// Storage key of the thumbnail
    pub thumbnail_path: String,

    /// Generated file name (basename of the original key)
    pub file_name: String,

    /// Size of the original in bytes
    pub file_size: u64,

    /// Content type the original was stored with
    pub content_type: String,

    /// BLAKE3 hash of the original bytes
    pub content_hash: String,

    /// Public URL of the original
    pub url: String,

    /// Public URL of the thumbnail
    pub thumbnail_url: String,

    /// Thumbnail width in pixels
    pub thumbnail_width: u32,

    /// Thumbnail height in pixels
    pub thumbnail_height: u32,

    /// Derived image metadata
    pub metadata: ImageMetadata,
}
