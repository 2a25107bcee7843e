//! Application configuration settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Main configuration for wikisync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiSyncConfig {
    /// Sync and backup preferences.
    pub preferences: Preferences,
    /// Text generation settings for commit messages.
    pub ai: AiConfig,
    /// Connectivity probing.
    pub network: NetworkConfig,
}

/// User preferences consulted by the sync engine on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Skip a sync while the wiki has drafts or unsaved edits.
    pub sync_only_when_no_draft: bool,
    /// Treat a failed draft query as "no drafts" so backups keep running.
    pub draft_check_fail_open: bool,
    /// Interval between automatic syncs, in milliseconds.
    pub sync_debounce_interval_ms: u64,
    /// Ask the text generation endpoint for a commit message.
    pub ai_generate_backup_title: bool,
    /// Upper bound on waiting for a generated commit message, in milliseconds.
    pub ai_generate_backup_title_timeout_ms: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sync_only_when_no_draft: true,
            draft_check_fail_open: true,
            sync_debounce_interval_ms: 30 * 60 * 1000,
            ai_generate_backup_title: false,
            ai_generate_backup_title_timeout_ms: 5000,
        }
    }
}

impl Preferences {
    /// Interval between automatic syncs.
    #[must_use]
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_debounce_interval_ms)
    }

    /// How long to wait for a generated commit message.
    #[must_use]
    pub const fn backup_title_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_generate_backup_title_timeout_ms)
    }
}

/// Text generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Default provider name (informational, sent nowhere).
    pub provider: Option<String>,
    /// Default model name.
    pub model: Option<String>,
    /// OpenAI-compatible endpoint base URL.
    #[serde(with = "url_serde")]
    pub base_url: Url,
    /// Bearer key for the endpoint.
    pub api_key: Option<String>,
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            base_url: Url::parse("https://api.openai.com/v1/").expect("valid default URL"),
            api_key: None,
            max_retries: 1,
        }
    }
}

impl AiConfig {
    /// Returns the provider/model pair when both are configured.
    #[must_use]
    pub fn default_model(&self) -> Option<ModelSelection> {
        match (self.provider.as_deref(), self.model.as_deref()) {
            (Some(provider), Some(model)) if !provider.is_empty() && !model.is_empty() => {
                Some(ModelSelection {
                    provider: provider.to_string(),
                    model: model.to_string(),
                })
            }
            _ => None,
        }
    }
}

/// A provider and model chosen for text generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    /// Provider name.
    pub provider: String,
    /// Model name.
    pub model: String,
}

/// Connectivity probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// URL probed with a HEAD request before the shutdown flush.
    #[serde(with = "url_serde")]
    pub probe_url: Url,
    /// Probe timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_url: Url::parse("https://github.com").expect("valid default URL"),
            timeout_secs: 3,
        }
    }
}

/// Custom serde module for URL serialization.
mod url_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use url::Url;

    pub fn serialize<S>(url: &Url, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(url.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Url, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Url::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Environment variables that can override configuration.
pub mod env {
    pub const AI_BASE_URL: &str = "WIKISYNC_AI_BASE_URL";
    pub const AI_MODEL: &str = "WIKISYNC_AI_MODEL";
    pub const AI_API_KEY: &str = "WIKISYNC_AI_API_KEY";
    pub const LOG_LEVEL: &str = "WIKISYNC_LOG";
}

impl WikiSyncConfig {
    /// Apply environment variable overrides to the configuration.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(env::AI_BASE_URL) {
            if let Ok(parsed) = Url::parse(&url) {
                self.ai.base_url = parsed;
            }
        }

        if let Ok(model) = std::env::var(env::AI_MODEL) {
            self.ai.model = Some(model);
        }

        if let Ok(key) = std::env::var(env::AI_API_KEY) {
            self.ai.api_key = Some(key);
        }

        self
    }
}
