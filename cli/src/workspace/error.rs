//! Workspace-specific error types.

use thiserror::Error;

use crate::error::WikiError;

/// Errors specific to workspace operations.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Workspace with the given id already exists.
    #[error("Workspace '{0}' already exists.")]
    AlreadyExists(String),

    /// Workspace with the given id was not found.
    #[error("Workspace '{0}' not found.")]
    NotFound(String),

    /// Invalid workspace id (contains invalid characters).
    #[error("Invalid workspace id '{0}': {1}")]
    InvalidName(String, String),

    /// Failed to serialize/deserialize workspace.
    #[error("Workspace data corrupted: {0}")]
    Corrupted(String),

    /// A sub-wiki points at a main wiki that does not exist.
    #[error("Sub-wiki '{sub}' refers to main wiki '{main}', which does not exist.")]
    MainWorkspaceNotFound {
        /// Sub-wiki id.
        sub: String,
        /// Missing main wiki id.
        main: String,
    },

    /// A remote-backed wiki was created without a remote URL or credentials.
    #[error("No git user info for synced wiki '{0}'. Log in to its storage service and set a remote URL.")]
    NoGitUserInfo(String),

    /// Git initialization failed and the new workspace was cleanly removed.
    #[error("Failed to initialize git for wiki '{name}': {source}")]
    InitFailed {
        /// Workspace name.
        name: String,
        /// What failed during initialization.
        source: Box<WikiError>,
    },

    /// Git initialization failed and cleaning up after it failed too.
    #[error("Failed to initialize git for wiki '{name}' ({init_error}), and reverting it failed: {source}")]
    RevertFailed {
        /// Workspace name.
        name: String,
        /// What failed during initialization.
        init_error: Box<WikiError>,
        /// What failed during cleanup.
        source: Box<WikiError>,
    },
}

impl WorkspaceError {
    /// True when a failed creation left state behind on disk.
    #[must_use]
    pub const fn is_revert_failure(&self) -> bool {
        matches!(self, Self::RevertFailed { .. })
    }

    /// Short category name shown as the title of a user-visible error.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::NoGitUserInfo(_) => "NoGitUserInfoError",
            Self::InitFailed { .. } => "InitWikiGitError",
            Self::RevertFailed { .. } => "InitWikiGitRevertError",
            Self::MainWorkspaceNotFound { .. } => "SubWikiOrphanError",
            _ => "WorkspaceError",
        }
    }
}
