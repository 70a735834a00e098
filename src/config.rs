use crate::defaults;
use crate::error::{Result, SigntypeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub gate: GateConfig,
    pub detection: DetectionConfig,
}

/// Classifier model and label table locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub labels: PathBuf,
    pub centroids: PathBuf,
}

/// Frame gate configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Reclaim a slot held longer than this; 0 disables reclamation.
    pub timeout_ms: u64,
}

/// Hand detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub min_confidence: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            labels: PathBuf::from(defaults::LABELS_FILE),
            centroids: PathBuf::from(defaults::MODEL_FILE),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::GATE_TIMEOUT_MS,
        }
    }
}

impl GateConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: defaults::MIN_DETECTION_CONFIDENCE,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SigntypeError::ConfigFileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(SigntypeError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SIGNTYPE_LABELS → model.labels
    /// - SIGNTYPE_MODEL → model.centroids
    /// - SIGNTYPE_GATE_TIMEOUT_MS → gate.timeout_ms
    /// - SIGNTYPE_MIN_CONFIDENCE → detection.min_confidence
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(labels) = std::env::var("SIGNTYPE_LABELS")
            && !labels.is_empty()
        {
            self.model.labels = PathBuf::from(labels);
        }

        if let Ok(model) = std::env::var("SIGNTYPE_MODEL")
            && !model.is_empty()
        {
            self.model.centroids = PathBuf::from(model);
        }

        if let Ok(timeout) = std::env::var("SIGNTYPE_GATE_TIMEOUT_MS")
            && !timeout.is_empty()
        {
            self.gate.timeout_ms =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| SigntypeError::ConfigInvalidValue {
                        key: "SIGNTYPE_GATE_TIMEOUT_MS".to_string(),
                        message: format!("'{timeout}' is not a number of milliseconds"),
                    })?;
        }

        if let Ok(confidence) = std::env::var("SIGNTYPE_MIN_CONFIDENCE")
            && !confidence.is_empty()
        {
            self.detection.min_confidence =
                confidence
                    .trim()
                    .parse()
                    .map_err(|_| SigntypeError::ConfigInvalidValue {
                        key: "SIGNTYPE_MIN_CONFIDENCE".to_string(),
                        message: format!("'{confidence}' is not a number"),
                    })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Rejects values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        let confidence = self.detection.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SigntypeError::ConfigInvalidValue {
                key: "detection.min_confidence".to_string(),
                message: format!("{confidence} is outside 0.0..=1.0"),
            });
        }
        Ok(())
    }

    /// Serialize to TOML, for `config show` and `config init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SigntypeError::Other(e.to_string()))
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/signtype/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("signtype")
            .join("config.toml")
    }
}
