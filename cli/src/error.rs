//! Error types and result aliases for wikisync.
//!
//! This module provides the crate-wide error type with:
//! - Specific error variants for different failure modes
//! - User-friendly error messages with recovery suggestions
//! - Helper methods for error classification
//! - Automatic conversion from common error types

use thiserror::Error;

use crate::git::GitError;
use crate::workspace::WorkspaceError;

/// Main error type for wikisync operations.
///
/// Use [`is_retriable`](Self::is_retriable) to tell transient failures (which the
/// next interval tick will retry anyway) from configuration problems.
#[derive(Error, Debug)]
pub enum WikiError {
    /// Stored credentials are malformed or corrupted.
    #[error("Invalid credentials for '{0}'. Try 'wikisync logout {0}' then 'wikisync login {0}'.")]
    InvalidCredentials(String),

    /// Failed to access the OS keyring.
    #[error("Failed to access credential storage: {0}. Ensure your system keyring is unlocked.")]
    CredentialStorage(String),

    /// Text generation endpoint returned a non-success status code.
    #[error("Text generation request failed ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the endpoint.
        message: String,
    },

    /// Request timed out.
    #[error("Request timed out. The server may be slow or unreachable. Try again later.")]
    Timeout,

    /// Network error during HTTP request.
    #[error("Network error: {0}. Check your internet connection.")]
    Network(String),

    /// The content runtime of a workspace failed.
    #[error("Wiki runtime error for workspace '{workspace}': {message}")]
    Runtime {
        /// Workspace id.
        workspace: String,
        /// What went wrong.
        message: String,
    },

    /// Interactive prompt could not be shown or read.
    #[error("Dialog failed: {0}")]
    Dialog(String),

    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}. Check file permissions and format.")]
    ConfigRead(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON or TOML serialization/deserialization failed.
    #[error("Data serialization error: {0}. This may indicate corrupted data.")]
    Serialization(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Workspace operation error.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// Git operation error.
    #[error(transparent)]
    Git(#[from] GitError),
}

impl WikiError {
    /// Checks if this error is transient and the operation might succeed on retry.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
            || matches!(self, Self::Git(GitError::Network(_)))
    }

    /// Creates a runtime error for a workspace.
    pub fn runtime(workspace: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Runtime {
            workspace: workspace.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using [`WikiError`].
pub type Result<T> = std::result::Result<T, WikiError>;

impl From<serde_json::Error> for WikiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for WikiError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigRead(format!("TOML parse error: {err}"))
    }
}

impl From<keyring::Error> for WikiError {
    fn from(err: keyring::Error) -> Self {
        Self::CredentialStorage(err.to_string())
    }
}

impl From<reqwest::Error> for WikiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for WikiError {
    fn from(err: reqwest_middleware::Error) -> Self {
        let err_str = err.to_string();
        if err_str.contains("timeout") || err_str.contains("timed out") {
            Self::Timeout
        } else {
            Self::Network(err_str)
        }
    }
}

impl From<tokio::task::JoinError> for WikiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Io(std::io::Error::other(format!("background task failed: {err}")))
    }
}
