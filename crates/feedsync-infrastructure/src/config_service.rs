//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from a TOML file (by default `~/.config/feedsync/config.toml`).

use crate::paths::FeedsyncPaths;
use feedsync_core::config::FeedsyncConfig;
use feedsync_core::error::{FeedsyncError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// Configuration service that loads and caches the root configuration.
///
/// A missing file yields the defaults; a malformed file is an error rather
/// than a silent fallback.
#[derive(Debug)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: RwLock<Option<FeedsyncConfig>>,
}

impl ConfigService {
    /// Creates a ConfigService reading from `path`.
    ///
    /// The configuration is loaded lazily on first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: RwLock::new(None),
        }
    }

    /// Creates a ConfigService reading from the platform default location.
    pub fn with_default_path() -> Result<Self> {
        Ok(Self::new(FeedsyncPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub async fn get_config(&self) -> Result<FeedsyncConfig> {
        // Check if already cached
        if let Some(cached) = self.config.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.load_config().await?;
        *self.config.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub async fn invalidate_cache(&self) {
        *self.config.write().await = None;
    }

    /// Writes `config` to the file and updates the cache.
    pub async fn save(&self, config: &FeedsyncConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let text = toml::to_string_pretty(config)?;
        fs::write(&self.path, text).await?;
        *self.config.write().await = Some(config.clone());
        tracing::info!("[ConfigService] Saved configuration to {:?}", self.path);
        Ok(())
    }

    async fn load_config(&self) -> Result<FeedsyncConfig> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => {
                let config: FeedsyncConfig = toml::from_str(&text)?;
                tracing::debug!("[ConfigService] Loaded configuration from {:?}", self.path);
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] No configuration at {:?}, using defaults",
                    self.path
                );
                Ok(FeedsyncConfig::default())
            }
            Err(e) => Err(FeedsyncError::from(e)),
        }
    }
}
