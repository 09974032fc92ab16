//! Thumbnail generation with JPEG output.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::{ResampleFilter, ThumbnailConfig};
use crate::error::PipelineError;
use crate::types::Thumbnail;

use super::decode::decode_bytes;

/// Generates fit-within-box thumbnails.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// Resize the image into the configured box and encode it as JPEG.
    ///
    /// Any source format is accepted; alpha is dropped before encoding.
    pub fn generate(&self, image: &DynamicImage) -> Result<Thumbnail, PipelineError> {
        let (width, height) = target_dimensions(
            image.width(),
            image.height(),
            self.config.width,
            self.config.height,
        );
        if width == 0 || height == 0 {
            return Err(PipelineError::ThumbnailGeneration {
                message: "source image has no pixels".to_string(),
            });
        }

        let resized = image.resize_exact(width, height, self.filter());
        let rgb = resized.to_rgb8();

        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.config.quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| PipelineError::ThumbnailGeneration {
                message: e.to_string(),
            })?;

        tracing::trace!(width, height, size = bytes.len(), "Encoded thumbnail");

        Ok(Thumbnail {
            bytes,
            width,
            height,
        })
    }

    /// Decode the bytes and generate a thumbnail. Decode failure is fatal.
    pub fn generate_from_bytes(&self, bytes: &[u8]) -> Result<Thumbnail, PipelineError> {
        let decoded =
            decode_bytes(bytes).map_err(|message| PipelineError::ThumbnailGeneration { message })?;
        self.generate(&decoded.image)
    }

    fn filter(&self) -> FilterType {
        match self.config.filter {
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Compute thumbnail dimensions that fit `(box_width, box_height)`.
///
/// A source relatively wider than the box takes the box width; otherwise it
/// takes the box height. The other side is floored and never below 1. A source
/// with a zero side yields `(0, 0)`.
pub fn target_dimensions(width: u32, height: u32, box_width: u32, box_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || box_width == 0 || box_height == 0 {
        return (0, 0);
    }

    let (w, h) = (width as u64, height as u64);
    let (bw, bh) = (box_width as u64, box_height as u64);

    // w/h > bw/bh  <=>  w*bh > h*bw
    if w * bh > h * bw {
        let th = (bw * h / w).max(1);
        (box_width, th as u32)
    } else {
        let tw = (bh * w / h).max(1);
        (tw as u32, box_height)
    }
}
