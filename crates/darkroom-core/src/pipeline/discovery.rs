//! Finding uploadable images on disk for batch ingestion.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::UploadConfig;

/// Discovers files whose extension is on the upload allow-list.
pub struct FileDiscovery {
    upload: UploadConfig,
}

/// A file found by [`FileDiscovery`].
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    pub fn new(upload: UploadConfig) -> Self {
        Self { upload }
    }

    /// Discover all allowed image files at a path.
    ///
    /// A file path is returned as-is when allowed; a directory is walked
    /// recursively. Results are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            return match std::fs::metadata(path) {
                Ok(meta) if self.is_allowed(path) => vec![DiscoveredFile {
                    path: path.to_path_buf(),
                    size: meta.len(),
                }],
                _ => vec![],
            };
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && self.is_allowed(entry.path()))
            .filter_map(|entry| {
                let size = entry.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: entry.into_path(),
                    size,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn is_allowed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.upload.is_extension_allowed(&format!(".{ext}")))
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_allowed() {
        let discovery = FileDiscovery::new(UploadConfig::default());

        assert!(discovery.is_allowed(Path::new("test.jpg")));
        assert!(discovery.is_allowed(Path::new("test.JPG")));
        assert!(discovery.is_allowed(Path::new("test.bmp")));
        assert!(discovery.is_allowed(Path::new("test.webp")));
        assert!(!discovery.is_allowed(Path::new("test.tiff")));
        assert!(!discovery.is_allowed(Path::new("test.txt")));
        assert!(!discovery.is_allowed(Path::new("jpg")));
    }

    #[test]
    fn test_discover_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"12345").unwrap();
        std::fs::write(dir.path().join("nested/a.JPG"), b"123").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let discovery = FileDiscovery::new(UploadConfig::default());
        let files = discovery.discover(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].path.ends_with("b.png"));
        assert!(files[1].path.ends_with("nested/a.JPG"));
        assert_eq!(FileDiscovery::total_size(&files), 8);

        let single = discovery.discover(&dir.path().join("notes.txt"));
        assert!(single.is_empty());
    }
}
