//! EXIF metadata extraction from uploaded images.
//!
//! Extraction never fails: every field is read independently and a missing or
//! malformed tag only leaves that field empty.

use chrono::NaiveDateTime;
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::io::Cursor;

use crate::types::ImageMetadata;

use super::decode::{format_to_string, read_header};

/// Extracts dimensions and EXIF metadata from image bytes.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract metadata from an in-memory image.
    ///
    /// Header and EXIF failures are logged at warn level and yield an
    /// otherwise-empty record.
    pub fn extract(bytes: &[u8]) -> ImageMetadata {
        let mut metadata = ImageMetadata::default();

        match read_header(bytes) {
            Ok((format, width, height)) => {
                metadata.format = Some(format_to_string(format));
                metadata.width = Some(width);
                metadata.height = Some(height);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to read image dimensions"),
        }

        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                tracing::debug!("No EXIF data in image");
                return metadata;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse EXIF data");
                return metadata;
            }
        };

        metadata.date_taken = Self::get_datetime(&exif);
        metadata.camera_model = Self::get_string(&exif, Tag::Model);
        metadata.aperture = Self::get_rational(&exif, Tag::FNumber);
        metadata.shutter_speed =
            Self::get_rational(&exif, Tag::ExposureTime).and_then(format_shutter_speed);
        metadata.iso = Self::get_u32(&exif, Tag::PhotographicSensitivity);
        metadata.focal_length = Self::get_rational(&exif, Tag::FocalLength);
        metadata.location = Self::get_location(&exif);

        metadata
    }

    fn field(exif: &Exif, tag: Tag) -> Option<&Field> {
        exif.get_field(tag, In::PRIMARY)
    }

    /// Get an ASCII field, trimmed of NUL padding and whitespace.
    fn get_string(exif: &Exif, tag: Tag) -> Option<String> {
        match &Self::field(exif, tag)?.value {
            Value::Ascii(parts) => {
                let raw = parts.first()?;
                let s = String::from_utf8_lossy(raw);
                let s = s.trim_matches(|c: char| c == '\0' || c.is_whitespace());
                (!s.is_empty()).then(|| s.to_string())
            }
            _ => None,
        }
    }

    /// Get a u32 field from EXIF data.
    fn get_u32(exif: &Exif, tag: Tag) -> Option<u32> {
        match &Self::field(exif, tag)?.value {
            Value::Short(v) => v.first().map(|&x| x as u32),
            Value::Long(v) => v.first().copied(),
            _ => None,
        }
    }

    /// Get the first rational of a field as a float. Zero denominators yield `None`.
    fn get_rational(exif: &Exif, tag: Tag) -> Option<f64> {
        match &Self::field(exif, tag)?.value {
            Value::Rational(v) => {
                let r = v.first()?;
                (r.denom != 0).then(|| r.num as f64 / r.denom as f64)
            }
            _ => None,
        }
    }

    /// Get the capture datetime, preferring DateTimeOriginal over DateTime.
    fn get_datetime(exif: &Exif) -> Option<NaiveDateTime> {
        [Tag::DateTimeOriginal, Tag::DateTime]
            .into_iter()
            .filter_map(|tag| Self::get_string(exif, tag))
            .find_map(|s| parse_exif_datetime(&s))
    }

    /// Get the GPS fix as "lat, lon", skipping a missing or zero fix.
    fn get_location(exif: &Exif) -> Option<String> {
        let lat = Self::get_gps_coord(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
        let lon = Self::get_gps_coord(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;
        if lat == 0.0 && lon == 0.0 {
            return None;
        }
        Some(format!("{lat:.6}, {lon:.6}"))
    }

    /// Get GPS coordinate, converting from degrees/minutes/seconds to decimal.
    fn get_gps_coord(exif: &Exif, coord_tag: Tag, ref_tag: Tag) -> Option<f64> {
        let coord = Self::field(exif, coord_tag)?;
        let reference = Self::get_string(exif, ref_tag)?;

        let degrees = parse_gps_rationals(&coord.value)?;

        // Apply sign based on reference (N/S for lat, E/W for lon)
        let sign = if reference.starts_with('S') || reference.starts_with('W') {
            -1.0
        } else {
            1.0
        };

        Some(sign * degrees)
    }
}

/// Parse GPS rationals (degrees, minutes, seconds) to decimal degrees.
fn parse_gps_rationals(value: &Value) -> Option<f64> {
    match value {
        Value::Rational(r) if r.len() >= 3 => {
            if r[..3].iter().any(|x| x.denom == 0) {
                return None;
            }
            let degrees = r[0].to_f64();
            let minutes = r[1].to_f64();
            let seconds = r[2].to_f64();
            Some(degrees + minutes / 60.0 + seconds / 3600.0)
        }
        _ => None,
    }
}

/// Parse an EXIF "YYYY:MM:DD HH:MM:SS" timestamp.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Format an exposure time in seconds.
///
/// One second or longer: at most one decimal, trailing `.0` dropped ("1 s",
/// "2.5 s"). Shorter: reciprocal rounded to a whole number ("1/125 s").
/// Non-positive or non-finite inputs yield `None`.
pub fn format_shutter_speed(seconds: f64) -> Option<String> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    if seconds >= 1.0 {
        let text = format!("{seconds:.1}");
        let text = text.strip_suffix(".0").unwrap_or(&text);
        Some(format!("{text} s"))
    } else {
        Some(format!("1/{:.0} s", (1.0 / seconds).round()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};

    #[test]
    fn test_shutter_speed_boundaries() {
        assert_eq!(format_shutter_speed(1.0).as_deref(), Some("1 s"));
        assert_eq!(format_shutter_speed(0.5).as_deref(), Some("1/2 s"));
        assert_eq!(format_shutter_speed(1.0 / 125.0).as_deref(), Some("1/125 s"));
        assert_eq!(format_shutter_speed(2.5).as_deref(), Some("2.5 s"));
        assert_eq!(format_shutter_speed(30.0).as_deref(), Some("30 s"));
        assert_eq!(format_shutter_speed(1.0 / 3.0).as_deref(), Some("1/3 s"));
    }

    #[test]
    fn test_shutter_speed_rejects_zero() {
        assert_eq!(format_shutter_speed(0.0), None);
        assert_eq!(format_shutter_speed(-1.0), None);
        assert_eq!(format_shutter_speed(f64::INFINITY), None);
    }

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2024:06:01 12:34:56").unwrap();
        assert_eq!(dt.to_string(), "2024-06-01 12:34:56");
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("garbage").is_none());
    }

    #[test]
    fn test_gps_rationals() {
        let value = Value::Rational(vec![
            exif::Rational { num: 45, denom: 1 },
            exif::Rational { num: 30, denom: 1 },
            exif::Rational { num: 0, denom: 1 },
        ]);
        assert_eq!(parse_gps_rationals(&value), Some(45.5));

        let zero_denom = Value::Rational(vec![
            exif::Rational { num: 45, denom: 0 },
            exif::Rational { num: 30, denom: 1 },
            exif::Rational { num: 0, denom: 1 },
        ]);
        assert_eq!(parse_gps_rationals(&zero_denom), None);
    }

    #[test]
    fn test_extract_garbage_never_panics() {
        let meta = MetadataExtractor::extract(b"not an image at all");
        assert_eq!(meta, ImageMetadata::default());

        let meta = MetadataExtractor::extract(&[]);
        assert_eq!(meta, ImageMetadata::default());
    }

    #[test]
    fn test_extract_png_without_exif() {
        let img = DynamicImage::new_rgb8(12, 7);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();

        let meta = MetadataExtractor::extract(buf.get_ref());
        assert_eq!(meta.width, Some(12));
        assert_eq!(meta.height, Some(7));
        assert_eq!(meta.format.as_deref(), Some("png"));
        assert!(!meta.has_exif());
    }

    #[test]
    fn test_extract_truncated_jpeg_prefixes() {
        let img = DynamicImage::new_rgb8(32, 32);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
        let bytes = buf.into_inner();

        // Every prefix must yield a record rather than panic
        for len in (0..bytes.len()).step_by(7) {
            let _ = MetadataExtractor::extract(&bytes[..len]);
        }
    }
}
