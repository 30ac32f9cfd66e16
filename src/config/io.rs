use std::path::{Path, PathBuf};

use crate::app_dirs;

use super::types::{AppConfig, ConfigError};

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the configuration file path, ensuring the parent directory exists.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir()?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the app directory, returning defaults if missing.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    load_from_path(&config_path()?)
}

/// Load configuration from a specific path, returning defaults if the file is absent.
///
/// Values are clamped into range and the classifier endpoint must parse as a URL.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str::<AppConfig>(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?
        .normalized();
    config.classifier.endpoint_url()?;
    Ok(config)
}

/// Persist configuration to the app directory, overwriting any previous contents.
pub fn save(config: &AppConfig) -> Result<(), ConfigError> {
    save_to_path(config, &config_path()?)
}

/// Save configuration to a specific path, creating parent directories as needed.
pub fn save_to_path(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
