//! Path management for feedsync configuration files.
//!
//! ```text
//! ~/.config/feedsync/          # Config directory (platform config dir)
//! └── config.toml              # Application configuration
//! ```

use feedsync_core::error::{FeedsyncError, Result};
use std::path::PathBuf;

pub struct FeedsyncPaths;

impl FeedsyncPaths {
    const APP_DIR: &'static str = "feedsync";

    /// Returns the feedsync configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/feedsync/`)
    /// - `Err(FeedsyncError::Config)`: The platform has no config directory
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or_else(|| FeedsyncError::config("Cannot find config directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
