//! Settings file location
//!
//! Resolves where the settings file lives and opens the default store.

use crate::error::{SettingsError, SettingsResult};
use crate::store::SettingsStore;
use std::path::PathBuf;
use tracing::info;

/// Environment variable overriding the settings file path
pub const CONFIG_ENV_VAR: &str = "SENSORLAB_CONFIG";

const APP_DIR: &str = "sensorlab";
const FILE_NAME: &str = "settings.toml";

/// Locates and opens the persistent settings file
pub struct SettingsManager;

impl SettingsManager {
    /// Platform configuration directory for SensorLab
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Settings file path, honouring `SENSORLAB_CONFIG`
    pub fn config_file_path() -> SettingsResult<PathBuf> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Ok(Self::config_dir()?.join(FILE_NAME)),
        }
    }

    /// Create the directory holding the settings file
    pub fn ensure_config_dir() -> SettingsResult<PathBuf> {
        let path = Self::config_file_path()?;
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e))
                })?;
            }
        }
        Ok(path)
    }

    /// Open the application's settings store.
    ///
    /// Nothing is read until the first access.
    pub fn open_store() -> SettingsResult<SettingsStore> {
        let path = Self::ensure_config_dir()?;
        info!("Settings file: {}", path.display());
        SettingsStore::open(&path)
    }
}
