//! Configuration for the Quill blog client.
//!
//! Provides TOML-based client configuration with:
//! - Server base URL, request timeout and user agent
//! - An optional data directory override for token storage
//! - Config directory discovery (`QUILL_CONFIG_DIR` → platform default)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    config_dir, config_path, load_config, load_config_file, save_config, LoadedConfig,
};
pub use error::{ConfigError, Result};
pub use types::{ClientConfig, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS};
