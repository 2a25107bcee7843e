//! Platform-specific path utilities for wikisync.

use std::path::PathBuf;

use crate::error::{Result, WikiError};

/// Get the configuration directory for wikisync.
///
/// - Linux: `~/.config/wikisync`
/// - macOS: `~/Library/Application Support/wikisync`
/// - Windows: `%APPDATA%\wikisync`
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| WikiError::Config("Cannot determine config directory".to_string()))?;
    Ok(base.join("wikisync"))
}

/// Get the data directory for wikisync.
///
/// - Linux: `~/.local/share/wikisync`
/// - macOS: `~/Library/Application Support/wikisync`
/// - Windows: `%APPDATA%\wikisync`
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| WikiError::Config("Cannot determine data directory".to_string()))?;
    Ok(base.join("wikisync"))
}

/// Get the main configuration file path.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the directory holding one JSON record per workspace.
pub fn workspaces_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("workspaces"))
}
