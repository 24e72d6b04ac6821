//! Configuration file resolution
//!
//! Locates the optional TOML bootstrap file for Sense binaries. Parsing and
//! override merging live with each binary; this module only answers "where
//! is the config file on this platform".

use crate::{Error, Result};
use std::path::PathBuf;

/// Locate the platform-appropriate config file, if one exists.
///
/// Linux: `~/.config/sense/config.toml`, then `/etc/sense/config.toml`.
/// macOS / Windows: the OS config directory plus `sense/config.toml`.
pub fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        if let Some(path) = dirs::config_dir().map(|d| d.join("sense").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/sense/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("sense").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config("No config file found".to_string()))
        }
    }
}
