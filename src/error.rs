//! Error types for signtype.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigntypeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Label table errors
    #[error("Label table is empty: {path}")]
    LabelTableEmpty { path: String },

    // Landmark record errors
    #[error("Invalid landmark record at line {line}: {message}")]
    LandmarkRecord { line: usize, message: String },

    // Classifier model errors
    #[error("Classifier model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Invalid classifier model: {message}")]
    ModelInvalid { message: String },

    #[error("Classifier unavailable: {message}")]
    ClassifierUnavailable { message: String },

    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),

    // Serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SigntypeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = SigntypeError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = SigntypeError::ConfigInvalidValue {
            key: "detection.min_confidence".to_string(),
            message: "must be between 0 and 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for detection.min_confidence: must be between 0 and 1"
        );
    }

    #[test]
    fn test_label_table_empty_display() {
        let error = SigntypeError::LabelTableEmpty {
            path: "labels.txt".to_string(),
        };
        assert_eq!(error.to_string(), "Label table is empty: labels.txt");
    }

    #[test]
    fn test_landmark_record_display() {
        let error = SigntypeError::LandmarkRecord {
            line: 7,
            message: "expected 3 coordinates".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid landmark record at line 7: expected 3 coordinates"
        );
    }

    #[test]
    fn test_model_errors_display() {
        let missing = SigntypeError::ModelNotFound {
            path: "/models/centroids.json".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Classifier model not found at /models/centroids.json"
        );

        let invalid = SigntypeError::ModelInvalid {
            message: "centroid 2 has 40 values".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "Invalid classifier model: centroid 2 has 40 values"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SigntypeError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: SigntypeError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: SigntypeError = json_error.into();
        assert!(error.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: SigntypeError = io_error.into();
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SigntypeError>();
        assert_sync::<SigntypeError>();
    }
}
