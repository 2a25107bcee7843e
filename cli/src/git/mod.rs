//! Git operations module for wikisync.
//!
//! Provides an abstraction layer over the git operations a wiki needs:
//! - Repository initialization and remote wiring
//! - Local commits
//! - Commit-and-sync and sync-or-force-pull against a remote
//! - Diff snapshots for describing pending changes

pub mod error;
pub mod operations;
pub mod types;

pub use error::GitError;
pub use operations::{Git2Operations, GitOperations};
pub use types::{DiffSnapshot, InitOptions, SyncOptions};

#[cfg(test)]
pub use operations::MockGitOperations;
