//! The `darkroom delete` command for removing stored photos.

use clap::Args;
use darkroom_core::pipeline::keys::thumbnail_key;
use darkroom_core::{Config, UploadPipeline};

/// Arguments for the `delete` command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Storage key of the original
    pub original: String,

    /// Storage key of the thumbnail (derived from the original when omitted)
    pub thumbnail: Option<String>,
}

/// Execute the delete command.
///
/// Deletion is best effort: missing objects and backend errors are logged,
/// and the command reports how many objects were removed.
pub async fn execute(args: DeleteArgs, config: &Config) -> anyhow::Result<()> {
    let pipeline = super::build_pipeline(config);
    let removed = delete_photo(&pipeline, &args).await;
    println!("Deleted {removed} object(s) from bucket '{}'", pipeline.sink().bucket());
    Ok(())
}

async fn delete_photo(pipeline: &UploadPipeline, args: &DeleteArgs) -> usize {
    let thumbnail = args
        .thumbnail
        .clone()
        .unwrap_or_else(|| thumbnail_key(&args.original));
    tracing::debug!(original = %args.original, %thumbnail, "Deleting photo");
    pipeline.delete(&args.original, &thumbnail).await
}
