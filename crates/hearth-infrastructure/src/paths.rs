//! Path management for hearth configuration files.
//!
//! ```text
//! ~/.config/hearth/            # Config directory (platform default)
//! └── config.toml              # Assistant configuration
//! ```

use hearth_core::{HearthError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "hearth";
const CONFIG_FILE: &str = "config.toml";

pub struct HearthPaths;

impl HearthPaths {
    /// Returns the hearth configuration directory.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the platform has no config directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| HearthError::config("Cannot find config directory"))
    }

    /// Returns the path of `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
