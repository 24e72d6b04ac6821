//! Configuration management for the Sense prediction service
//!
//! Two-tier configuration:
//! 1. **TOML bootstrap**: port, artifact paths, clip truncation (static,
//!    read once at startup)
//! 2. **Overrides**: command-line arguments and environment variables
//!
//! Settings sources priority:
//! 1. Command-line arguments (--port, --model, ...)
//! 2. Environment variables (SENSE_PORT, SENSE_MODEL_PATH, ...)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error; the service starts with defaults.

use crate::error::{Error, Result};
use sense_common::config::find_config_file;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn default_port() -> u16 {
    5000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/sense.onnx")
}

fn default_labels_path() -> PathBuf {
    PathBuf::from("model/featuresdf.csv")
}

/// Bootstrap configuration loaded from the TOML file
///
/// These settings cannot change during runtime. The service must restart to
/// pick up changes.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the serialized ONNX classifier
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Path to the reference CSV providing the class-label column
    #[serde(default = "default_labels_path")]
    pub labels_path: PathBuf,

    /// Directory for uploaded temp files (default: OS temp dir)
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,

    /// Truncate uploads to the first N seconds before feature extraction.
    /// Off by default; some deployments enable it as a short-clip optimization.
    #[serde(default)]
    pub clip_seconds: Option<f32>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            model_path: default_model_path(),
            labels_path: default_labels_path(),
            upload_dir: None,
            clip_seconds: None,
        }
    }
}

impl TomlConfig {
    /// Load bootstrap config from an explicit path, or from the standard
    /// platform location when no path is given.
    ///
    /// A missing file yields built-in defaults with a warning; a malformed
    /// file is a hard error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) => p.to_path_buf(),
            None => match find_config_file() {
                Ok(p) => p,
                Err(_) => {
                    warn!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: TomlConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Malformed config file {}: {}", path.display(), e))
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Fully resolved runtime settings, built once in main and shared immutably.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub upload_dir: PathBuf,
    pub clip_seconds: Option<f32>,
}

impl Settings {
    /// Merge CLI/env overrides over the TOML bootstrap config.
    ///
    /// Rejects a non-positive `clip_seconds` at startup; truncating to zero
    /// samples would otherwise fail every request with an opaque decode-side
    /// error.
    pub fn resolve(
        toml: TomlConfig,
        port: Option<u16>,
        model_path: Option<PathBuf>,
        labels_path: Option<PathBuf>,
        upload_dir: Option<PathBuf>,
        clip_seconds: Option<f32>,
    ) -> Result<Self> {
        let clip_seconds = clip_seconds.or(toml.clip_seconds);
        if let Some(seconds) = clip_seconds {
            // `!(> 0.0)` also catches NaN
            if !(seconds > 0.0) {
                return Err(Error::Config(format!(
                    "clip_seconds must be positive, got {}",
                    seconds
                )));
            }
        }

        Ok(Self {
            port: port.unwrap_or(toml.port),
            model_path: model_path.unwrap_or(toml.model_path),
            labels_path: labels_path.unwrap_or(toml.labels_path),
            upload_dir: upload_dir
                .or(toml.upload_dir)
                .unwrap_or_else(std::env::temp_dir),
            clip_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_defaults_applied_for_missing_keys() {
        let config: TomlConfig = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path, PathBuf::from("model/sense.onnx"));
        assert_eq!(config.labels_path, PathBuf::from("model/featuresdf.csv"));
        assert!(config.clip_seconds.is_none());
    }

    #[test]
    fn full_toml_parses() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 9000
            model_path = "artifacts/classifier.onnx"
            labels_path = "artifacts/labels.csv"
            upload_dir = "/var/tmp/sense"
            clip_seconds = 4.0
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.clip_seconds, Some(4.0));
        assert_eq!(config.upload_dir, Some(PathBuf::from("/var/tmp/sense")));
    }

    #[test]
    fn cli_override_wins_over_toml() {
        let settings = Settings::resolve(
            TomlConfig::default(),
            Some(9999),
            None,
            None,
            None,
            Some(4.0),
        )
        .unwrap();
        assert_eq!(settings.port, 9999);
        assert_eq!(settings.clip_seconds, Some(4.0));
        assert_eq!(settings.upload_dir, std::env::temp_dir());
    }

    #[test]
    fn non_positive_clip_seconds_is_rejected_at_startup() {
        for bad in [0.0, -1.5] {
            let result =
                Settings::resolve(TomlConfig::default(), None, None, None, None, Some(bad));
            assert!(matches!(result, Err(Error::Config(_))), "{} accepted", bad);
        }
    }

    #[test]
    fn non_positive_clip_seconds_from_toml_is_rejected() {
        let config: TomlConfig = toml::from_str("clip_seconds = -4.0").unwrap();
        let result = Settings::resolve(config, None, None, None, None, None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
