//! Sub-configuration structs with defaults matching the gallery deployment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resource limits to protect against problematic uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in bytes (inclusive)
    pub max_file_size_bytes: u64,

    /// Minimum upload size in bytes; anything smaller is a truncated upload
    pub min_file_size_bytes: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Validation + decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Metadata + thumbnail timeout in milliseconds
    pub thumbnail_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024,
            min_file_size_bytes: 16,
            max_image_dimension: 10000,
            decode_timeout_ms: 10_000,
            thumbnail_timeout_ms: 10_000,
        }
    }
}

impl LimitsConfig {
    /// Maximum upload size in whole megabytes, for display.
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_bytes / (1024 * 1024)
    }
}

/// Accepted upload formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Allowed file extensions, with leading dot, lower-case
    pub allowed_extensions: Vec<String>,

    /// Allowed declared MIME types, lower-case
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_content_types: [
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/bmp",
                "image/webp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl UploadConfig {
    /// Check an extension (with leading dot) against the allow-list, ignoring case.
    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        let ext = extension.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.to_lowercase() == ext)
    }

    /// Check a declared content type against the allow-list.
    ///
    /// Comparison ignores case and any `; param=value` suffix.
    pub fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.to_lowercase() == essence)
    }
}

/// Resampling filter used when shrinking thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Bicubic (Catmull-Rom spline)
    #[default]
    CatmullRom,
    /// Lanczos with window 3
    Lanczos3,
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Target box width in pixels
    pub width: u32,

    /// Target box height in pixels
    pub height: u32,

    /// JPEG quality (1-100)
    pub quality: u8,

    /// Resampling filter
    pub filter: ResampleFilter,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            quality: 85,
            filter: ResampleFilter::CatmullRom,
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under `storage.root_dir`
    #[default]
    Local,
    /// In-process map, discarded on exit (dry runs)
    Memory,
}

/// How original and thumbnail keys are laid out in the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyLayout {
    /// `{name}` and `thumb_{name}` at the bucket root
    #[default]
    Flat,
    /// `photos/{album}/{name}` and `thumbnails/{album}/{name}`
    Album,
}

/// Object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend stores the objects
    pub backend: StorageBackend,

    /// Bucket name
    pub bucket: String,

    /// Root directory for the local backend
    pub root_dir: PathBuf,

    /// Key layout
    pub layout: KeyLayout,

    /// CDN domain serving the bucket (e.g. "photos.example.com")
    pub cdn_domain: Option<String>,

    /// Provider account id for direct URLs (supports ${ENV_VAR} syntax)
    pub account_id: Option<String>,

    /// Provider domain for direct URLs
    pub provider_domain: String,

    /// Per-put timeout in milliseconds
    pub put_timeout_ms: u64,

    /// Max retry attempts for transient storage failures
    pub retry_attempts: u32,

    /// Base backoff delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            bucket: "photos".to_string(),
            root_dir: PathBuf::from("~/.darkroom/storage"),
            layout: KeyLayout::Flat,
            cdn_domain: None,
            account_id: Some("${R2_ACCOUNT_ID}".to_string()),
            provider_domain: "r2.cloudflarestorage.com".to_string(),
            put_timeout_ms: 30_000,
            retry_attempts: 2,
            retry_delay_ms: 250,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
