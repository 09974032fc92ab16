//! The `darkroom ingest` command for storing photos.

mod batch;
pub mod types;

pub use types::{Backend, OutputFormat};

use clap::Args;
use darkroom_core::pipeline::FileDiscovery;
use darkroom_core::{
    Config, IngestOptions, IngestOutcome, InvalidUpload, OutputWriter, PipelineError,
    UploadPipeline, UploadRequest, USER_UPLOAD_FAILED,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use batch::ingest_batch;

/// Arguments for the `ingest` command.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Photo file or directory to ingest
    #[arg(required = true)]
    pub input: PathBuf,

    /// Album the photos belong to
    #[arg(short, long)]
    pub album: String,

    /// Declared content type (inferred from the extension when omitted)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Location to record when a photo carries no GPS fix
    #[arg(long)]
    pub location: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Number of photos ingested concurrently
    #[arg(short, long, default_value = "4")]
    pub parallel: usize,

    /// Storage backend (overrides storage.backend)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Per-photo deadline in milliseconds for the work before storage
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Request fields shared by every file in one invocation.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub album_id: String,
    pub content_type: Option<String>,
    pub location: Option<String>,
    /// Files above this are rejected without being read
    pub max_file_size_bytes: u64,
}

impl RequestTemplate {
    fn request_for(&self, path: &Path, bytes: Vec<u8>) -> UploadRequest {
        let file_name = file_name_of(path);
        let content_type = self
            .content_type
            .clone()
            .or_else(|| content_type_for(path).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let request = UploadRequest::new(bytes, file_name, content_type, self.album_id.as_str());
        match &self.location {
            Some(location) => request.with_location(location.as_str()),
            None => request,
        }
    }
}

/// Execute the ingest command.
pub async fn execute(args: IngestArgs, mut config: Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }
    if let Some(backend) = args.backend {
        config.storage.backend = backend.into();
    }

    let pipeline = super::build_pipeline(&config);
    let options = ingest_options(&args, watch_ctrl_c());
    let template = RequestTemplate {
        album_id: args.album.clone(),
        content_type: args.content_type.clone(),
        location: args.location.clone(),
        max_file_size_bytes: config.limits.max_file_size_bytes,
    };

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), true);

    let (succeeded, failed) = if args.input.is_file() {
        let outcome = ingest_file(&pipeline, &args.input, &template, &options).await;
        writer.write(&outcome)?;
        if outcome.is_stored() {
            (1, 0)
        } else {
            (0, 1)
        }
    } else {
        let files = FileDiscovery::new(config.upload.clone()).discover(&args.input);
        if files.is_empty() {
            tracing::warn!("No supported photos found at {}", args.input.display());
            return Ok(());
        }
        tracing::info!(
            count = files.len(),
            bytes = FileDiscovery::total_size(&files),
            "Ingesting directory"
        );
        let stats = ingest_batch(
            &pipeline,
            files,
            &template,
            &options,
            args.parallel,
            &mut writer,
        )
        .await?;
        (stats.succeeded, stats.failed)
    };

    writer.finish()?;

    if failed > 0 {
        anyhow::bail!("{failed} of {} photo(s) failed", succeeded + failed);
    }
    Ok(())
}

/// Read one file from disk and run it through the pipeline.
///
/// Never fails: read errors and pipeline errors both become a `Failed` outcome.
pub async fn ingest_file(
    pipeline: &UploadPipeline,
    path: &Path,
    template: &RequestTemplate,
    options: &IngestOptions,
) -> IngestOutcome {
    let source = path.display().to_string();

    if let Ok(meta) = tokio::fs::metadata(path).await {
        if meta.len() > template.max_file_size_bytes {
            let error = PipelineError::InvalidUpload {
                file_name: file_name_of(path),
                reason: InvalidUpload::TooLarge {
                    size: meta.len(),
                    max: template.max_file_size_bytes,
                },
            };
            tracing::warn!(path = %source, error = %error, "Upload rejected");
            return IngestOutcome::failed(source, &error);
        }
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %source, error = %e, "Failed to read file");
            return IngestOutcome::Failed {
                source,
                message: USER_UPLOAD_FAILED.to_string(),
                detail: format!("failed to read file: {e}"),
            };
        }
    };

    let request = template.request_for(path, bytes);
    match pipeline.ingest(request, options).await {
        Ok(result) => IngestOutcome::stored(source, result),
        Err(e) => IngestOutcome::failed(source, &e),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Map a file extension to the MIME type a browser would declare for it.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime)
}

fn ingest_options(args: &IngestArgs, cancel: CancellationToken) -> IngestOptions {
    let options = IngestOptions::default().with_cancel(cancel);
    match args.timeout_ms {
        Some(ms) => options.with_timeout(Duration::from_millis(ms)),
        None => options,
    }
}

/// Cancel pending photos on Ctrl-C. Photos already writing run to completion.
fn watch_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling photos not yet in storage");
            cancel.cancel();
        }
    });
    token
}
