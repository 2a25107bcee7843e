//! Configuration management for wikisync.

pub mod paths;
pub mod settings;

pub use paths::config_file;
pub use settings::{AiConfig, NetworkConfig, Preferences, WikiSyncConfig};

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Result, WikiError};

/// Preferences shared between the orchestrator, scheduler and synthesizer.
///
/// Readers take a snapshot per call so a preference change applies to the
/// next sync without restarting anything.
pub type SharedPreferences = Arc<RwLock<Preferences>>;

/// Load configuration from the default config file.
///
/// If the config file doesn't exist, returns default configuration.
pub fn load_config() -> Result<WikiSyncConfig> {
    let path = config_file()?;
    load_config_from(&path)
}

/// Load configuration from a specific path.
///
/// If the file doesn't exist, returns default configuration.
pub fn load_config_from(path: &Path) -> Result<WikiSyncConfig> {
    if !path.exists() {
        return Ok(WikiSyncConfig::default().with_env_overrides());
    }

    let contents = std::fs::read_to_string(path)?;
    let config: WikiSyncConfig =
        toml::from_str(&contents).map_err(|e| WikiError::ConfigRead(e.to_string()))?;

    Ok(config.with_env_overrides())
}
