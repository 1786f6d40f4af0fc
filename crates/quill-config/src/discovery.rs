//! Config file discovery.
//!
//! Resolution order (later overrides earlier):
//! 1. `<config dir>/config.toml`
//! 2. `QUILL_SERVER_URL` environment variable
//! 3. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ClientConfig, ConfigError, Result};

/// Config filename within the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application name for platform directory resolution.
const APP_NAME: &str = "quill";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "QUILL_CONFIG_DIR";

/// Environment variable to override the server URL.
const SERVER_URL_ENV: &str = "QUILL_SERVER_URL";

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The effective configuration.
    pub config: ClientConfig,
    /// File that was checked.
    pub path: Option<PathBuf>,
    /// Whether the file existed and was loaded.
    pub loaded: bool,
}

impl LoadedConfig {
    /// Directory holding the persisted session token.
    ///
    /// Uses `data_dir` from the config if set, otherwise the config directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.config.data_dir {
            return Ok(dir.clone());
        }
        self.path
            .as_ref()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .or_else(config_dir)
            .ok_or(ConfigError::NoDirectory("config"))
    }
}

/// Discover and load the client configuration.
///
/// `dir` overrides both `QUILL_CONFIG_DIR` and the platform default. A missing
/// file is not an error; defaults are used instead.
pub fn load_config(dir: Option<&Path>) -> Result<LoadedConfig> {
    let path = match dir {
        Some(dir) => Some(dir.join(CONFIG_FILE)),
        None => config_path(),
    };

    let (mut config, loaded) = match &path {
        Some(p) if p.is_file() => (load_config_file(p)?, true),
        _ => (ClientConfig::default(), false),
    };

    if let Ok(server) = std::env::var(SERVER_URL_ENV)
        && !server.is_empty()
    {
        config.server = server;
    }

    debug!(path = ?path, loaded, server = %config.server, "Client config resolved");

    Ok(LoadedConfig {
        config,
        path,
        loaded,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<ClientConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    ClientConfig::from_toml(&contents)
}

/// Save configuration to a file, creating parent directories.
pub fn save_config(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_toml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Path of the user config file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Config directory for quill.
///
/// Checks `QUILL_CONFIG_DIR` first, then falls back to the platform default.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
