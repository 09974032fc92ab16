//! JSON and JSONL reporting of ingestion outcomes.

use serde::Serialize;
use std::io::{self, Write};

use crate::error::PipelineError;
use crate::types::UploadResult;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object, or an array for batches
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    Stored {
        /// Path or name the bytes came from
        source: String,
        #[serde(flatten)]
        result: UploadResult,
    },
    Failed {
        source: String,
        /// Caller-safe message
        message: String,
        /// Full error chain for operators
        detail: String,
    },
}

impl IngestOutcome {
    pub fn stored(source: impl Into<String>, result: UploadResult) -> Self {
        Self::Stored {
            source: source.into(),
            result,
        }
    }

    pub fn failed(source: impl Into<String>, error: &PipelineError) -> Self {
        Self::Failed {
            source: source.into(),
            message: error.user_message().to_string(),
            detail: error.to_string(),
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// Serializes outcomes as they complete.
///
/// JSONL writes each item immediately. JSON buffers items and emits them on
/// [`OutputWriter::finish`]: one object for a single item, an array otherwise.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    pending: Vec<serde_json::Value>,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON output; JSONL is always one line per item.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            pending: Vec::new(),
            items_written: 0,
        }
    }

    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::to_value(item).map_err(io::Error::other)?;
                self.pending.push(value);
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
                self.writer.flush()?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Emit buffered JSON and flush. Returns the number of items written.
    pub fn finish(mut self) -> io::Result<usize> {
        if self.format == OutputFormat::Json && !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            let value = if pending.len() == 1 {
                pending.into_iter().next().unwrap_or_default()
            } else {
                serde_json::Value::Array(pending)
            };
            if self.pretty {
                serde_json::to_writer_pretty(&mut self.writer, &value)
            } else {
                serde_json::to_writer(&mut self.writer, &value)
            }
            .map_err(io::Error::other)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.items_written)
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidUpload;
    use crate::types::ImageMetadata;

    fn sample_result() -> UploadResult {
        UploadResult {
            file_path: "20240601_123456_deadbeef_a.jpg".to_string(),
            thumbnail_path: "thumb_20240601_123456_deadbeef_a.jpg".to_string(),
            file_name: "20240601_123456_deadbeef_a.jpg".to_string(),
            file_size: 1234,
            content_type: "image/jpeg".to_string(),
            content_hash: "00".repeat(32),
            url: "https://cdn.example.com/20240601_123456_deadbeef_a.jpg".to_string(),
            thumbnail_url: "https://cdn.example.com/thumb_20240601_123456_deadbeef_a.jpg"
                .to_string(),
            thumbnail_width: 300,
            thumbnail_height: 225,
            metadata: ImageMetadata {
                width: Some(4000),
                height: Some(3000),
                ..Default::default()
            },
        }
    }

    fn rejection() -> PipelineError {
        PipelineError::InvalidUpload {
            file_name: "notes.jpg".to_string(),
            reason: InvalidUpload::UnrecognizedFormat,
        }
    }

    #[test]
    fn test_outcome_serialization() {
        let stored = serde_json::to_value(IngestOutcome::stored("a.jpg", sample_result())).unwrap();
        assert_eq!(stored["status"], "stored");
        assert_eq!(stored["source"], "a.jpg");
        assert_eq!(stored["thumbnail_width"], 300);
        assert_eq!(stored["metadata"]["width"], 4000);

        let failed = serde_json::to_value(IngestOutcome::failed("notes.jpg", &rejection())).unwrap();
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["message"], "Failed to upload photo. Please try again.");
        assert!(failed["detail"].as_str().unwrap().contains("magic bytes"));
    }

    #[test]
    fn test_jsonl_writes_one_line_per_item() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer
            .write(&IngestOutcome::stored("a.jpg", sample_result()))
            .unwrap();
        writer
            .write(&IngestOutcome::failed("b.jpg", &rejection()))
            .unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"status\":\"failed\""));
    }

    #[test]
    fn test_json_single_item_is_object() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write(&IngestOutcome::stored("a.jpg", sample_result()))
            .unwrap();
        writer.finish().unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(value.is_object());
    }

    #[test]
    fn test_json_batch_is_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, true);
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            writer.write(&IngestOutcome::failed(name, &rejection())).unwrap();
        }
        writer.finish().unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_json_empty_writes_nothing() {
        let mut buffer = Vec::new();
        let writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        assert_eq!(writer.finish().unwrap(), 0);
        assert!(buffer.is_empty());
    }
}
