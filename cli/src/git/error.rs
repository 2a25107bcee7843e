//! Git-specific error types.
//!
//! This module defines error types for git operations:
//! - [`GitError`] - All git-related errors with user-friendly messages

use git2::{ErrorClass, ErrorCode};
use thiserror::Error;

/// Errors specific to git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Not in a git repository.
    #[error("Not a git repository. The wiki folder has no git working tree.")]
    NotARepository,

    /// Local and remote history could not be reconciled.
    #[error("Git operation failed due to conflicts: {0}")]
    Conflict(String),

    /// Fetch or push failed at the transport level.
    #[error("Git network error: {0}. Check your connection and access token.")]
    Network(String),

    /// A remote operation was requested without a remote URL.
    #[error("No remote URL configured for this wiki.")]
    MissingRemote,

    /// A remote operation was requested without credentials.
    #[error("No git credentials available for this wiki.")]
    MissingCredentials,

    /// Reading or writing working tree files failed.
    #[error("Working tree IO error: {0}")]
    Io(String),

    /// General git2 library error.
    #[error("Git error: {0}")]
    Git2(String),
}

impl GitError {
    /// Checks if this error is due to conflicts.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match (err.class(), err.code()) {
            // git2 reports merge conflicts with a generic code, so the class decides.
            (ErrorClass::Merge, _) | (_, ErrorCode::Conflict | ErrorCode::MergeConflict) => {
                Self::Conflict(err.message().to_string())
            }
            (ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssl | ErrorClass::Ssh, _)
            | (_, ErrorCode::Auth | ErrorCode::Certificate | ErrorCode::NotFastForward) => {
                Self::Network(err.message().to_string())
            }
            _ => Self::Git2(err.message().to_string()),
        }
    }
}

impl From<std::io::Error> for GitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
