//! Configuration file handling for farmchain.
//!
//! Loads configuration from `~/.config/farmchain/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{FacingMode, VideoConstraints, DEFAULT_JPEG_QUALITY};
use crate::location::{PositionOptions, DEFAULT_MAXIMUM_AGE, DEFAULT_TIMEOUT};

/// Configuration file structure for farmchain.
/// Loaded from ~/.config/farmchain/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_facing")]
    pub facing: FacingMode,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: default_facing(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_maximum_age_ms")]
    pub maximum_age_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: default_timeout_ms(),
            maximum_age_ms: default_maximum_age_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_facing() -> FacingMode {
    FacingMode::Environment
}

fn default_jpeg_quality() -> f32 {
    DEFAULT_JPEG_QUALITY
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_maximum_age_ms() -> u64 {
    DEFAULT_MAXIMUM_AGE.as_millis() as u64
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or holds
    /// out-of-range values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Check value ranges that the TOML types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let quality = self.camera.jpeg_quality;
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.jpeg_quality must be in (0.0, 1.0], got {}",
                quality
            )));
        }
        if self.location.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "location.timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Constraints for camera stream requests.
    pub fn video_constraints(&self) -> VideoConstraints {
        VideoConstraints {
            facing_mode: self.camera.facing,
            audio: false,
        }
    }

    /// Options for position requests.
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.location.high_accuracy,
            timeout: Duration::from_millis(self.location.timeout_ms),
            maximum_age: Duration::from_millis(self.location.maximum_age_ms),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("farmchain").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/farmchain/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.camera.facing, FacingMode::Environment);
        assert_eq!(config.camera.jpeg_quality, 0.8);
        assert_eq!(config.position_options(), PositionOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config("[location]\ntimeout_ms = 5000\n");
        let config = Config::load(Some(file.path())).unwrap();
        let options = config.position_options();
        assert_eq!(options.timeout, Duration::from_millis(5000));
        assert_eq!(options.maximum_age, Duration::from_millis(60_000));
        assert!(options.high_accuracy);
    }

    #[test]
    fn test_front_camera_config() {
        let file = write_config("[camera]\nfacing = \"user\"\njpeg_quality = 0.5\n");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.video_constraints().facing_mode, FacingMode::User);
        assert!(!config.video_constraints().audio);
        assert_eq!(config.camera.jpeg_quality, 0.5);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let file = write_config("[camera\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_out_of_range_quality_is_rejected() {
        let file = write_config("[camera]\njpeg_quality = 1.5\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let file = write_config("[location]\ntimeout_ms = 0\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        assert!(default_path().ends_with("farmchain/config.toml"));
    }
}
