//! Storage key generation.
//!
//! Key format: `{yyyyMMdd_HHmmss}_{8 hex}_{sanitized stem}{ext}`. The thumbnail
//! key is always derived from the original key, never generated separately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{KeyLayout, UploadConfig};
use crate::error::PipelineError;

/// Fallback stem for names that sanitize to nothing.
const FALLBACK_STEM: &str = "photo";

/// Fallback album segment for ids that sanitize to nothing.
const FALLBACK_ALBUM: &str = "unsorted";

const THUMB_PREFIX: &str = "thumb_";
const PHOTOS_SEGMENT: &str = "photos/";
const THUMBNAILS_SEGMENT: &str = "thumbnails/";

/// The pair of keys one upload is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Key of the original object
    pub original: String,
    /// Key of the thumbnail object
    pub thumbnail: String,
    /// Generated file name, the last segment of `original`
    pub file_name: String,
}

/// Derives collision-resistant, path-safe storage keys.
///
/// Safe to share across tasks: the clock and the thread-local RNG are the only
/// sources of variation.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    upload: UploadConfig,
    layout: KeyLayout,
}

impl KeyGenerator {
    pub fn new(upload: UploadConfig, layout: KeyLayout) -> Self {
        Self { upload, layout }
    }

    /// Generate keys for an upload using the current UTC time.
    pub fn generate(&self, file_name: &str, album_id: &str) -> Result<StorageKeys, PipelineError> {
        self.generate_at(file_name, album_id, Utc::now())
    }

    /// Generate keys for an upload at a fixed time.
    pub fn generate_at(
        &self,
        file_name: &str,
        album_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StorageKeys, PipelineError> {
        let (stem, extension) = split_file_name(file_name);
        if extension.is_empty() || !self.upload.is_extension_allowed(&extension) {
            return Err(PipelineError::UnsupportedExtension {
                file_name: file_name.to_string(),
                extension,
            });
        }

        let unique = format!("{:032x}", rand::random::<u128>());
        let generated = format!(
            "{}_{}_{}{}",
            now.format("%Y%m%d_%H%M%S"),
            &unique[..8],
            sanitize_stem(stem),
            extension
        );

        let original = match self.layout {
            KeyLayout::Flat => generated.clone(),
            KeyLayout::Album => format!("{PHOTOS_SEGMENT}{}/{generated}", sanitize_album(album_id)),
        };
        let thumbnail = thumbnail_key(&original);

        Ok(StorageKeys {
            original,
            thumbnail,
            file_name: generated,
        })
    }
}

/// Derive the thumbnail key from an original key.
///
/// `photos/...` keys swap the first segment for `thumbnails/`; anything else
/// gets a `thumb_` prefix on its last segment.
pub fn thumbnail_key(original: &str) -> String {
    if let Some(rest) = original.strip_prefix(PHOTOS_SEGMENT) {
        return format!("{THUMBNAILS_SEGMENT}{rest}");
    }
    match original.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/{THUMB_PREFIX}{name}"),
        None => format!("{THUMB_PREFIX}{original}"),
    }
}

/// Split a client file name into stem and lower-cased extension (with dot).
///
/// Directory components (either separator) are dropped. A name with no dot
/// has an empty extension; a name like `.jpg` has an empty stem.
pub fn split_file_name(file_name: &str) -> (&str, String) {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) => (&base[..idx], base[idx..].to_lowercase()),
        None => (base, String::new()),
    }
}

/// Reduce a file stem to letters, digits and underscores.
///
/// Spaces and hyphens become underscores; everything else outside the set is
/// dropped. An empty result becomes `photo`. Idempotent.
pub fn sanitize_stem(stem: &str) -> String {
    let clean: String = stem
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if clean.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        clean
    }
}

fn sanitize_album(album_id: &str) -> String {
    let clean: String = album_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if clean.is_empty() {
        FALLBACK_ALBUM.to_string()
    } else {
        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn flat() -> KeyGenerator {
        KeyGenerator::new(UploadConfig::default(), KeyLayout::Flat)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 34, 56).unwrap()
    }

    #[test]
    fn test_key_shape() {
        let keys = flat()
            .generate_at("My Holiday-Pic.JPG", "album", fixed_time())
            .unwrap();
        let name = &keys.file_name;
        assert!(name.starts_with("20240601_123456_"), "{name}");
        assert!(name.ends_with("_My_Holiday_Pic.jpg"), "{name}");
        let random = &name[16..24];
        assert_eq!(random.len(), 8);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(keys.original, keys.file_name);
        assert_eq!(keys.thumbnail, format!("thumb_{}", keys.file_name));
    }

    #[test]
    fn test_album_layout() {
        let generator = KeyGenerator::new(UploadConfig::default(), KeyLayout::Album);
        let keys = generator
            .generate_at("a.png", "3fa85f64-5717-4562-b3fc-2c963f66afa6", fixed_time())
            .unwrap();
        assert!(keys
            .original
            .starts_with("photos/3fa85f64-5717-4562-b3fc-2c963f66afa6/20240601_123456_"));
        assert_eq!(
            keys.thumbnail,
            keys.original.replacen("photos/", "thumbnails/", 1)
        );
        assert!(keys.original.ends_with(&keys.file_name));
    }

    #[test]
    fn test_album_id_cannot_escape() {
        let generator = KeyGenerator::new(UploadConfig::default(), KeyLayout::Album);
        let keys = generator.generate_at("a.png", "../../etc", fixed_time()).unwrap();
        assert!(keys.original.starts_with("photos/etc/"));
        let keys = generator.generate_at("a.png", "/..", fixed_time()).unwrap();
        assert!(keys.original.starts_with("photos/unsorted/"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = flat().generate("script.exe", "a").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnsupportedExtension { ref extension, .. } if extension == ".exe"
        ));
        assert!(flat().generate("README", "a").is_err());
    }

    #[test]
    fn test_sanitize_fallback_and_idempotence() {
        assert_eq!(sanitize_stem(""), "photo");
        assert_eq!(sanitize_stem("$$$"), "photo");
        assert_eq!(sanitize_stem("a b-c"), "a_b_c");
        assert_eq!(sanitize_stem("café_01"), "café_01");

        for input in ["", "..", "a b-c!?", "héllo wörld", "photo", "x\u{0}y\t", "<script>"] {
            let once = sanitize_stem(input);
            assert_eq!(sanitize_stem(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_dotfile_name_becomes_photo() {
        let keys = flat().generate_at(".jpg", "a", fixed_time()).unwrap();
        assert!(keys.file_name.ends_with("_photo.jpg"));
    }

    #[test]
    fn test_no_traversal_or_control_chars() {
        let hostile = [
            "../../../etc/passwd.jpg",
            "..\\..\\windows\\win.ini.png",
            "a/../b.gif",
            "evil\u{0}name\r\n.webp",
            "....jpeg",
            "dir\\sub/.. .bmp",
        ];
        for generator in [
            flat(),
            KeyGenerator::new(UploadConfig::default(), KeyLayout::Album),
        ] {
            for name in hostile {
                let keys = generator.generate(name, "../album").unwrap();
                for key in [&keys.original, &keys.thumbnail, &keys.file_name] {
                    assert!(!key.contains(".."), "{key}");
                    assert!(!key.contains('\\'), "{key}");
                    assert!(!key.chars().any(|c| c.is_control()), "{key}");
                    assert!(!key.starts_with('/'), "{key}");
                }
            }
        }
    }

    #[test]
    fn test_same_name_same_second_is_unique() {
        let generator = flat();
        let now = fixed_time();
        let keys: HashSet<String> = (0..500)
            .map(|_| generator.generate_at("photo.jpg", "a", now).unwrap().original)
            .collect();
        assert_eq!(keys.len(), 500);
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("a.JPG"), ("a", ".jpg".to_string()));
        assert_eq!(split_file_name("dir/x.y.png"), ("x.y", ".png".to_string()));
        assert_eq!(split_file_name("C:\\u\\b.gif"), ("b", ".gif".to_string()));
        assert_eq!(split_file_name("noext"), ("noext", String::new()));
    }

    #[test]
    fn test_thumbnail_key_derivation() {
        assert_eq!(thumbnail_key("x.jpg"), "thumb_x.jpg");
        assert_eq!(thumbnail_key("photos/a/x.jpg"), "thumbnails/a/x.jpg");
        assert_eq!(thumbnail_key("other/x.jpg"), "other/thumb_x.jpg");
    }
}
