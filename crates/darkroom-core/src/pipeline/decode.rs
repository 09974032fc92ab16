//! In-memory image decoding with content-based format detection.

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Build a reader over the buffer with the format guessed from content.
fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, String> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| format!("Cannot detect image format: {e}"))?;
    if reader.format().is_none() {
        return Err("Cannot detect image format".to_string());
    }
    Ok(reader)
}

/// Read format and pixel dimensions from the image header only.
///
/// Cheap: no pixel data is decoded.
pub fn read_header(bytes: &[u8]) -> Result<(ImageFormat, u32, u32), String> {
    let reader = reader(bytes)?;
    let format = reader.format().ok_or("Cannot detect image format")?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("Cannot read image header: {e}"))?;
    Ok((format, width, height))
}

/// Fully decode an image from an in-memory buffer.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, String> {
    let reader = reader(bytes)?;
    let format = reader.format().ok_or("Cannot detect image format")?;
    let image = reader.decode().map_err(|e| e.to_string())?;

    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        image,
        format,
        width,
        height,
    })
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}
