//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_bytes must be > 0".into(),
            ));
        }
        if self.limits.min_file_size_bytes >= self.limits.max_file_size_bytes {
            return Err(ConfigError::ValidationError(
                "limits.min_file_size_bytes must be < limits.max_file_size_bytes".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.thumbnail_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.thumbnail_timeout_ms must be > 0".into(),
            ));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.allowed_extensions must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .upload
            .allowed_extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(ConfigError::ValidationError(format!(
                "upload.allowed_extensions entry '{bad}' must start with '.'"
            )));
        }
        if self.upload.allowed_content_types.is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.allowed_content_types must not be empty".into(),
            ));
        }
        if self.thumbnail.width == 0 || self.thumbnail.height == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.width and thumbnail.height must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(ConfigError::ValidationError(
                "thumbnail.quality must be between 1 and 100".into(),
            ));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.bucket must not be empty".into(),
            ));
        }
        if self.storage.put_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "storage.put_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_size() {
        let mut config = Config::default();
        config.limits.max_file_size_bytes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_file_size_bytes"));
    }

    #[test]
    fn test_validate_rejects_min_above_max() {
        let mut config = Config::default();
        config.limits.min_file_size_bytes = config.limits.max_file_size_bytes;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_file_size_bytes"));
    }

    #[test]
    fn test_validate_rejects_zero_thumbnail_box() {
        let mut config = Config::default();
        config.thumbnail.height = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("thumbnail.width"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_extension_without_dot() {
        let mut config = Config::default();
        config.upload.allowed_extensions.push("tif".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'tif'"));
    }

    #[test]
    fn test_validate_rejects_blank_bucket() {
        let mut config = Config::default();
        config.storage.bucket = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));
    }
}
