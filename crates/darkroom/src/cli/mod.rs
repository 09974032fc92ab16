//! Command handlers for the Darkroom CLI.

pub mod config;
pub mod delete;
pub mod ingest;
pub mod url;

use darkroom_core::{create_store, Config, UploadPipeline};

/// Build the pipeline over the configured storage backend.
pub(crate) fn build_pipeline(config: &Config) -> UploadPipeline {
    let store = create_store(config);
    tracing::debug!(
        backend = store.name(),
        bucket = %config.storage.bucket,
        "Storage backend ready"
    );
    UploadPipeline::new(config, store)
}
