//! Configuration service implementation.
//!
//! Loads [`EngineConfig`] from `config.toml` and caches it. A missing file
//! yields the defaults; a malformed file is an error.

use escape_core::config::EngineConfig;
use escape_core::error::{EscapeError, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::paths::EscapePaths;

/// Configuration service that loads and caches the engine configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config file, `None` uses the platform default
    path: Option<PathBuf>,
    /// Cached configuration
    config: Arc<RwLock<Option<EngineConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform default `config.toml`.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading the given file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::Config` if the file exists but cannot be read
    /// or parsed, or if no config location can be determined.
    pub fn get_config(&self) -> Result<EngineConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let loaded = self.load_config()?;
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => EscapePaths::config_file().map_err(|e| EscapeError::config(e.to_string())),
        }
    }

    fn load_config(&self) -> Result<EngineConfig> {
        let path = self.config_path()?;
        if !path.exists() {
            tracing::debug!("[ConfigService] {:?} not found, using defaults", path);
            return Ok(EngineConfig::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| EscapeError::config(format!("Failed to read {:?}: {}", path, e)))?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| EscapeError::config(format!("Failed to parse {:?}: {}", path, e)))?;
        if config.leaderboard.default_limit == 0
            || config.leaderboard.default_limit > config.leaderboard.max_limit
        {
            return Err(EscapeError::config(format!(
                "leaderboard.default_limit must be within 1..={}",
                config.leaderboard.max_limit
            )));
        }
        tracing::info!("[ConfigService] Loaded configuration from {:?}", path);
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[turn]\nevaluator_timeout_secs = 5\n").unwrap();

        let config = ConfigService::with_path(&path).get_config().unwrap();
        assert_eq!(config.turn.evaluator_timeout_secs, 5);
        assert_eq!(config.turn.max_message_chars, 2000);
        assert_eq!(config.leaderboard.default_limit, 15);
    }

    #[test]
    fn test_cache_and_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(&path);
        assert_eq!(service.get_config().unwrap().leaderboard.max_limit, 100);

        fs::write(&path, "[leaderboard]\nmax_limit = 50\n").unwrap();
        assert_eq!(service.get_config().unwrap().leaderboard.max_limit, 100);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().leaderboard.max_limit, 50);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[turn\n").unwrap();
        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, EscapeError::Config(_)));

        fs::write(&path, "[leaderboard]\ndefault_limit = 0\n").unwrap();
        assert!(ConfigService::with_path(&path).get_config().is_err());
    }
}
