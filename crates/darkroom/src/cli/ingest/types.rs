//! CLI enum types for the ingest command: output format and storage backend.

use clap::ValueEnum;
use darkroom_core::config::StorageBackend;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for darkroom_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Jsonl => Self::JsonLines,
        }
    }
}

/// Storage backend override.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Backend {
    /// Files under `storage.root_dir`
    Local,
    /// Discard everything on exit (dry run)
    Memory,
}

impl From<Backend> for StorageBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Local => StorageBackend::Local,
            Backend::Memory => StorageBackend::Memory,
        }
    }
}
