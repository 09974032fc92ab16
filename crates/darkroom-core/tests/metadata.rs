//! EXIF edge cases through `MetadataExtractor::extract`.

mod common;

use common::{ascii, camera_fields, encode, rationals, with_exif};
use darkroom_core::pipeline::MetadataExtractor;
use exif::{Field, In, Tag, Value};
use image::ImageFormat;

fn jpeg_with(fields: &[Field]) -> Vec<u8> {
    with_exif(&encode(64, 48, ImageFormat::Jpeg), fields)
}

#[test]
fn test_datetime_used_without_original() {
    let bytes = jpeg_with(&[ascii(Tag::DateTime, "2023:01:02 03:04:05")]);
    let meta = MetadataExtractor::extract(&bytes);
    assert_eq!(
        meta.date_taken.map(|d| d.to_string()).as_deref(),
        Some("2023-01-02 03:04:05")
    );
}

#[test]
fn test_datetime_original_preferred() {
    let bytes = jpeg_with(&[
        ascii(Tag::DateTime, "2023:01:02 03:04:05"),
        ascii(Tag::DateTimeOriginal, "2020:12:31 23:59:58"),
    ]);
    let meta = MetadataExtractor::extract(&bytes);
    assert_eq!(
        meta.date_taken.map(|d| d.to_string()).as_deref(),
        Some("2020-12-31 23:59:58")
    );
}

#[test]
fn test_zero_denominators_are_skipped() {
    let bytes = jpeg_with(&[
        ascii(Tag::Model, "Pixel 8"),
        rationals(Tag::FNumber, &[(28, 0)]),
        rationals(Tag::ExposureTime, &[(1, 0)]),
        rationals(Tag::FocalLength, &[(50, 0)]),
    ]);
    let meta = MetadataExtractor::extract(&bytes);
    assert!(meta.aperture.is_none());
    assert!(meta.shutter_speed.is_none());
    assert!(meta.focal_length.is_none());
    // Neighbouring fields are unaffected
    assert_eq!(meta.camera_model.as_deref(), Some("Pixel 8"));
    assert_eq!((meta.width, meta.height), (Some(64), Some(48)));
}

#[test]
fn test_zero_gps_fix_has_no_location() {
    let bytes = jpeg_with(&[
        ascii(Tag::GPSLatitudeRef, "N"),
        rationals(Tag::GPSLatitude, &[(0, 1), (0, 1), (0, 1)]),
        ascii(Tag::GPSLongitudeRef, "E"),
        rationals(Tag::GPSLongitude, &[(0, 1), (0, 1), (0, 1)]),
    ]);
    assert!(MetadataExtractor::extract(&bytes).location.is_none());
}

#[test]
fn test_gps_without_reference_has_no_location() {
    let fields: Vec<Field> = camera_fields()
        .into_iter()
        .filter(|f| f.tag != Tag::GPSLongitudeRef)
        .collect();
    let meta = MetadataExtractor::extract(&jpeg_with(&fields));
    assert!(meta.location.is_none());
    assert_eq!(meta.iso, Some(100));
}

#[test]
fn test_iso_stored_as_long() {
    let bytes = jpeg_with(&[Field {
        tag: Tag::PhotographicSensitivity,
        ifd_num: In::PRIMARY,
        value: Value::Long(vec![3200]),
    }]);
    assert_eq!(MetadataExtractor::extract(&bytes).iso, Some(3200));
}
