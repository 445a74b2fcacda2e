//! Configuration service implementation.
//!
//! Loads the assistant configuration from `config.toml`, applies
//! environment overrides and caches the result.

use crate::paths::HearthPaths;
use hearth_core::config::AssistantConfig;
use hearth_core::{HearthError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const ENV_SERVICE_URL: &str = "HEARTH_SERVICE_URL";
pub const ENV_IDENTITY_URL: &str = "HEARTH_IDENTITY_URL";
pub const ENV_ACCESS_TOKEN: &str = "HEARTH_ACCESS_TOKEN";

/// Configuration service that loads and caches the assistant configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AssistantConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading `<config dir>/hearth/config.toml`.
    pub fn new_default() -> Result<Self> {
        Ok(Self::with_path(HearthPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file yields the defaults.
    pub fn get_config(&self) -> Result<AssistantConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|e| HearthError::internal(e.to_string()))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let mut loaded = Self::load_from(&self.path)?;
        apply_env_overrides(&mut loaded, |key| std::env::var(key).ok());

        let mut write_lock = self
            .config
            .write()
            .map_err(|e| HearthError::internal(e.to_string()))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Writes `config` to the file and refreshes the cache.
    pub fn save(&self, config: &AssistantConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        self.invalidate_cache();
        Ok(())
    }

    fn load_from(path: &Path) -> Result<AssistantConfig> {
        if !path.exists() {
            tracing::info!(
                "[Config] No config at {}, using defaults",
                path.display()
            );
            return Ok(AssistantConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }
}

/// Overrides connection settings from the environment.
pub fn apply_env_overrides<F>(config: &mut AssistantConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_SERVICE_URL) {
        config.service_url = url;
    }
    if let Some(url) = lookup(ENV_IDENTITY_URL) {
        config.identity_url = url;
    }
    if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
        config.access_token = Some(token);
    }
}
