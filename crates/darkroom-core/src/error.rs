//! Error types for the Darkroom ingestion pipeline.
//!
//! Errors are organized by stage so that logs carry actionable context (file
//! names, keys, stage names) while callers only ever see a generic message via
//! [`PipelineError::user_message`].

use thiserror::Error;

/// Top-level error type for Darkroom operations.
#[derive(Error, Debug)]
pub enum DarkroomError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Why an upload was rejected by the validator.
///
/// Every variant is non-retryable: the same bytes will be rejected again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidUpload {
    #[error("upload is empty")]
    Empty,

    #[error("upload too small: {size} bytes < {min} bytes")]
    TooSmall { size: u64, min: u64 },

    #[error("upload too large: {size} bytes > {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("file extension '{extension}' is not allowed")]
    ExtensionNotAllowed { extension: String },

    #[error("content type '{content_type}' is not allowed")]
    ContentTypeNotAllowed { content_type: String },

    #[error("file name contains a path traversal sequence")]
    PathTraversal,

    #[error("unrecognized image format (invalid magic bytes)")]
    UnrecognizedFormat,

    #[error("image dimensions {width}x{height} exceed {max_dim}")]
    DimensionsTooLarge { width: u32, height: u32, max_dim: u32 },

    #[error("content does not decode as an image: {message}")]
    Decode { message: String },
}

/// Which of the two objects of an upload a storage failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRole {
    Original,
    Thumbnail,
}

impl std::fmt::Display for ObjectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectRole::Original => write!(f, "original"),
            ObjectRole::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Validation failed; nothing was written to storage
    #[error("Invalid upload '{file_name}': {reason}")]
    InvalidUpload {
        file_name: String,
        reason: InvalidUpload,
    },

    /// Key generation was handed a name the validator should have rejected
    #[error("Unsupported extension '{extension}' for '{file_name}'")]
    UnsupportedExtension {
        file_name: String,
        extension: String,
    },

    /// Thumbnail could not be produced
    #[error("Thumbnail generation failed: {message}")]
    ThumbnailGeneration { message: String },

    /// An object could not be stored
    #[error("Storage upload of {role} '{key}' failed: {source}")]
    StorageUpload {
        role: ObjectRole,
        key: String,
        #[source]
        source: StorageError,
    },

    /// A pre-write stage ran past its deadline
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// The caller cancelled the upload before any storage write started
    #[error("Upload cancelled during {stage} stage")]
    Cancelled { stage: String },

    /// A blocking worker panicked or was aborted
    #[error("Internal error in {stage} stage: {message}")]
    Internal { stage: String, message: String },
}

/// Caller-safe text for every failed upload. Details stay in the logs.
pub const USER_UPLOAD_FAILED: &str = "Failed to upload photo. Please try again.";

impl PipelineError {
    /// Message that may be shown to an end user.
    ///
    /// Never includes keys, paths or backend error text.
    pub fn user_message(&self) -> &'static str {
        USER_UPLOAD_FAILED
    }

    /// True when the failure happened before any storage write was attempted.
    pub fn is_pre_write(&self) -> bool {
        !matches!(self, PipelineError::StorageUpload { .. })
    }
}

/// Errors reported by an object store backend.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Backend answered with a non-success status
    #[error("backend rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Backend could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Request did not finish in time
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Key is not acceptable for this backend
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// Local I/O failure
    #[error("I/O failure: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// Convenience type alias for Darkroom results.
pub type Result<T> = std::result::Result<T, DarkroomError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Convenience type alias for storage results.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
