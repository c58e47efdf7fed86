//! Error types for birdwatch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BirdwatchError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Chunk staging errors
    #[error("Failed to stage audio chunk: {message}")]
    Staging { message: String },

    // Classification errors
    #[error("Classification failed: {message}")]
    Classification { message: String },

    // Detection storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, BirdwatchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_invalid_value_display() {
        let error = BirdwatchError::ConfigInvalidValue {
            key: "chunking.overlap_fraction".to_string(),
            message: "must be below 1.0".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for chunking.overlap_fraction: must be below 1.0"
        );
    }

    #[test]
    fn test_audio_device_not_found_display() {
        let error = BirdwatchError::AudioDeviceNotFound {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio device not found: default");
    }

    #[test]
    fn test_audio_capture_display() {
        let error = BirdwatchError::AudioCapture {
            message: "buffer overflow".to_string(),
        };
        assert_eq!(error.to_string(), "Audio capture failed: buffer overflow");
    }

    #[test]
    fn test_staging_display() {
        let error = BirdwatchError::Staging {
            message: "disk full".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to stage audio chunk: disk full");
    }

    #[test]
    fn test_classification_display() {
        let error = BirdwatchError::Classification {
            message: "analyzer exited with status 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Classification failed: analyzer exited with status 1"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: BirdwatchError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: BirdwatchError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let sqlite_error = rusqlite::Error::InvalidQuery;
        let error: BirdwatchError = sqlite_error.into();
        assert!(error.to_string().contains("Database error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<BirdwatchError>();
        assert_sync::<BirdwatchError>();
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: BirdwatchError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }
}
