//! Upload validation before any storage work.
//!
//! Cheap checks (size, extension, content type, file name) run first and
//! short-circuit; the authoritative check is a real decode of the bytes.

use image::ImageFormat;

use crate::config::{LimitsConfig, UploadConfig};
use crate::error::InvalidUpload;

use super::decode::{decode_bytes, read_header, DecodedImage};
use super::keys::split_file_name;

/// Validates uploads before processing.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
    upload: UploadConfig,
}

impl Validator {
    /// Create a new validator with the given limits and allow-lists.
    pub fn new(limits: LimitsConfig, upload: UploadConfig) -> Self {
        Self { limits, upload }
    }

    /// Validate an upload and return the decoded image.
    ///
    /// Checks, in order:
    /// - byte length is non-zero and within the configured floor and ceiling
    /// - extension is allowed (case-insensitive)
    /// - declared content type is allowed
    /// - file name has no `..` sequence
    /// - magic bytes match a supported format
    /// - header dimensions are within limits
    /// - the bytes fully decode
    pub fn validate(
        &self,
        bytes: &[u8],
        file_name: &str,
        content_type: &str,
    ) -> Result<DecodedImage, InvalidUpload> {
        self.check_cheap(bytes, file_name, content_type)?;
        self.check_content(bytes)
    }

    /// Boolean form of [`Validator::validate`].
    pub fn is_valid(&self, bytes: &[u8], file_name: &str, content_type: &str) -> bool {
        self.validate(bytes, file_name, content_type).is_ok()
    }

    /// Checks that never look inside the bytes.
    pub fn check_cheap(
        &self,
        bytes: &[u8],
        file_name: &str,
        content_type: &str,
    ) -> Result<(), InvalidUpload> {
        let size = bytes.len() as u64;
        if size == 0 {
            return Err(InvalidUpload::Empty);
        }
        if size < self.limits.min_file_size_bytes {
            return Err(InvalidUpload::TooSmall {
                size,
                min: self.limits.min_file_size_bytes,
            });
        }
        if size > self.limits.max_file_size_bytes {
            return Err(InvalidUpload::TooLarge {
                size,
                max: self.limits.max_file_size_bytes,
            });
        }

        let (_, extension) = split_file_name(file_name);
        if !self.upload.is_extension_allowed(&extension) {
            return Err(InvalidUpload::ExtensionNotAllowed { extension });
        }

        if !self.upload.is_content_type_allowed(content_type) {
            return Err(InvalidUpload::ContentTypeNotAllowed {
                content_type: content_type.to_string(),
            });
        }

        if file_name.contains("..") {
            return Err(InvalidUpload::PathTraversal);
        }

        Ok(())
    }

    /// Sniff, bound and decode the bytes.
    fn check_content(&self, bytes: &[u8]) -> Result<DecodedImage, InvalidUpload> {
        if sniff_format(bytes).is_none() {
            return Err(InvalidUpload::UnrecognizedFormat);
        }

        let (_, width, height) =
            read_header(bytes).map_err(|message| InvalidUpload::Decode { message })?;
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(InvalidUpload::DimensionsTooLarge {
                width,
                height,
                max_dim,
            });
        }

        decode_bytes(bytes).map_err(|message| InvalidUpload::Decode { message })
    }
}

/// Identify a supported upload format from its magic bytes.
pub fn sniff_format(header: &[u8]) -> Option<ImageFormat> {
    if header.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
        return Some(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47
    if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
        return Some(ImageFormat::Png);
    }

    // GIF: GIF8
    if &header[0..4] == b"GIF8" {
        return Some(ImageFormat::Gif);
    }

    // WebP: RIFF....WEBP
    if &header[0..4] == b"RIFF" {
        if header.len() >= 12 && &header[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        return None;
    }

    // BMP: BM
    if header[0] == b'B' && header[1] == b'M' {
        return Some(ImageFormat::Bmp);
    }

    None
}
