//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use darkroom_core::config::StorageBackend;
use darkroom_core::storage::MemoryObjectStore;
use darkroom_core::{Config, UploadPipeline};
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Encode a gradient image in the given format.
pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

pub fn rationals(tag: Tag, values: &[(u32, u32)]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            values
                .iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
    }
}

/// EXIF tags of a typical camera capture.
///
/// f/2.8, 1/125 s, ISO 100, 50 mm, taken 2024-06-01 12:34:56 at
/// 45.123456, -75.654321.
pub fn camera_fields() -> Vec<Field> {
    vec![
        ascii(Tag::Model, "Canon EOS R5"),
        ascii(Tag::DateTimeOriginal, "2024:06:01 12:34:56"),
        rationals(Tag::FNumber, &[(28, 10)]),
        rationals(Tag::ExposureTime, &[(1, 125)]),
        rationals(Tag::FocalLength, &[(50, 1)]),
        Field {
            tag: Tag::PhotographicSensitivity,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![100]),
        },
        ascii(Tag::GPSLatitudeRef, "N"),
        rationals(Tag::GPSLatitude, &[(45, 1), (7, 1), (244_416, 10_000)]),
        ascii(Tag::GPSLongitudeRef, "W"),
        rationals(Tag::GPSLongitude, &[(75, 1), (39, 1), (155_556, 10_000)]),
    ]
}

/// Serialize EXIF fields into a little-endian TIFF block.
pub fn tiff_block(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, true).unwrap();
    buf.into_inner()
}

/// Insert an APP1 Exif segment right after the JPEG SOI marker.
pub fn with_exif(jpeg: &[u8], fields: &[Field]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let tiff = tiff_block(fields);
    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A JPEG of the given size carrying [`camera_fields`].
pub fn camera_jpeg(width: u32, height: u32) -> Vec<u8> {
    with_exif(&encode(width, height, ImageFormat::Jpeg), &camera_fields())
}

/// Default config against the in-memory backend with fast retries.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Memory;
    config.storage.retry_delay_ms = 1;
    config.storage.cdn_domain = Some("cdn.example.com".to_string());
    config
}

/// A pipeline over a fresh in-memory store, returning both.
pub fn memory_pipeline(config: &Config) -> (UploadPipeline, Arc<MemoryObjectStore>) {
    let store = Arc::new(MemoryObjectStore::new());
    let pipeline = UploadPipeline::new(config, store.clone());
    (pipeline, store)
}
