//! Unified path management for escape-room files.
//!
//! Configuration lives in the platform config directory and game data
//! (sessions, accounts, results) in the platform data directory.

use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "escape-room";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// The platform directory could not be determined.
    #[error("Cannot determine the {0} directory")]
    DirNotFound(&'static str),
}

/// Unified path management.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/escape-room/        # Config directory
/// ├── config.toml               # Engine configuration
/// └── stages.toml               # Optional custom stage catalog
///
/// ~/.local/share/escape-room/   # Data directory
/// ├── accounts.toml
/// ├── results.toml
/// └── sessions/
/// ```
pub struct EscapePaths;

impl EscapePaths {
    /// Returns the configuration directory (e.g. `~/.config/escape-room/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("config"))
    }

    /// Returns the data directory (e.g. `~/.local/share/escape-room/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("data"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path of the optional custom stage catalog.
    pub fn catalog_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("stages.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let Ok(config_file) = EscapePaths::config_file() else {
            return;
        };
        assert!(config_file.ends_with("escape-room/config.toml"));
        assert!(config_file.starts_with(EscapePaths::config_dir().unwrap()));
    }

    #[test]
    fn test_data_dir() {
        if let Ok(data_dir) = EscapePaths::data_dir() {
            assert!(data_dir.ends_with("escape-room"));
        }
    }
}
