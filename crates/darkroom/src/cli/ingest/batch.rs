//! Directory ingestion with bounded concurrency and a progress bar.

use darkroom_core::pipeline::DiscoveredFile;
use darkroom_core::{IngestOptions, OutputWriter, UploadPipeline};
use futures_util::stream::{self, StreamExt};
use std::io::Write;
use std::time::{Duration, Instant};

use super::{ingest_file, RequestTemplate};

/// Totals for a finished batch.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub succeeded: u64,
    pub failed: u64,
    pub total_bytes: u64,
    pub elapsed: Duration,
}

impl BatchStats {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Photos per second over the whole batch.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total() as f64 / secs
        } else {
            0.0
        }
    }

    /// Megabytes of originals read per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_bytes as f64 / 1_000_000.0 / secs
        } else {
            0.0
        }
    }
}

/// Ingest every discovered file, at most `parallel` at a time.
///
/// Outcomes are written in completion order as they arrive.
pub async fn ingest_batch<W: Write>(
    pipeline: &UploadPipeline,
    files: Vec<DiscoveredFile>,
    template: &RequestTemplate,
    options: &IngestOptions,
    parallel: usize,
    writer: &mut OutputWriter<W>,
) -> anyhow::Result<BatchStats> {
    let start = Instant::now();
    let progress = create_progress_bar(files.len() as u64);
    let mut stats = BatchStats::default();

    let mut outcomes = stream::iter(files)
        .map(|file| async move {
            let outcome = ingest_file(pipeline, &file.path, template, options).await;
            (file, outcome)
        })
        .buffer_unordered(parallel.max(1));

    while let Some((file, outcome)) = outcomes.next().await {
        if outcome.is_stored() {
            stats.succeeded += 1;
            stats.total_bytes += file.size;
        } else {
            stats.failed += 1;
        }
        writer.write(&outcome)?;

        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        progress.set_message(name);
        progress.inc(1);
    }

    progress.finish_with_message("done");
    stats.elapsed = start.elapsed();
    print_summary(&stats);
    Ok(stats)
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a batch.
fn print_summary(stats: &BatchStats) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Stored:       {:>8}", stats.succeeded);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", stats.total());
    eprintln!("    Duration:     {:>7.1}s", stats.elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} photos/sec", stats.rate());
    eprintln!("    Throughput:   {:>7.1} MB/sec", stats.throughput());
    eprintln!("  ====================================");
}
