//! Git-related types for wikisync.
//!
//! This module defines data structures for git operations:
//! - [`InitOptions`] - How to initialize a wiki's working tree
//! - [`SyncOptions`] - Remote, identity and message for a sync
//! - [`DiffSnapshot`] - Pending changes, used to describe a commit

use std::path::PathBuf;

use crate::auth::GitUserInfo;

/// Name of the remote every wiki syncs with.
pub const ORIGIN: &str = "origin";

/// Branch used when credentials don't name one.
pub const DEFAULT_BRANCH: &str = "main";

/// Commit message used when none was generated.
pub const DEFAULT_SYNC_MESSAGE: &str = "Wiki sync";

/// Options for initializing a wiki's git working tree.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Working tree path.
    pub path: PathBuf,
    /// Whether the wiki syncs with a remote.
    pub is_remote: bool,
    /// Main wikis push their initial commit; sub-wikis only fetch.
    pub is_main_wiki: bool,
    /// Remote repository URL.
    pub remote_url: Option<String>,
    /// Identity used for commits and transport.
    pub credentials: Option<GitUserInfo>,
}

/// Options for a commit-and-sync or sync-or-force-pull.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Remote repository URL.
    pub remote_url: String,
    /// Identity used for commits and transport.
    pub credentials: GitUserInfo,
    /// Message for the commit of local changes.
    pub commit_message: Option<String>,
}

impl SyncOptions {
    /// Branch to sync on the remote.
    #[must_use]
    pub fn remote_branch(&self) -> &str {
        branch_or_default(&self.credentials)
    }

    /// The commit message, falling back to [`DEFAULT_SYNC_MESSAGE`].
    #[must_use]
    pub fn message(&self) -> &str {
        self.commit_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_SYNC_MESSAGE)
    }
}

/// Returns the credential's branch, or [`DEFAULT_BRANCH`] when blank.
#[must_use]
pub fn branch_or_default(credentials: &GitUserInfo) -> &str {
    let branch = credentials.branch.trim();
    if branch.is_empty() {
        DEFAULT_BRANCH
    } else {
        branch
    }
}

/// Pending changes of a working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSnapshot {
    /// Patch of working tree changes not yet staged.
    pub unstaged: String,
    /// Patch of staged changes against HEAD.
    pub staged: String,
    /// Untracked files, relative to the working tree root.
    pub untracked: Vec<PathBuf>,
}

impl DiffSnapshot {
    /// Unstaged followed by staged patch text.
    #[must_use]
    pub fn combined_patch(&self) -> String {
        let mut out = String::with_capacity(self.unstaged.len() + self.staged.len() + 1);
        out.push_str(&self.unstaged);
        if !self.unstaged.is_empty() && !self.staged.is_empty() && !self.unstaged.ends_with('\n')
        {
            out.push('\n');
        }
        out.push_str(&self.staged);
        out
    }

    /// Returns true if there is nothing to describe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unstaged.trim().is_empty() && self.staged.trim().is_empty() && self.untracked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(branch: &str) -> GitUserInfo {
        GitUserInfo {
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            access_token: "t".to_string(),
            branch: branch.to_string(),
        }
    }

    #[test]
    fn blank_branch_falls_back_to_main() {
        assert_eq!(branch_or_default(&creds("")), "main");
        assert_eq!(branch_or_default(&creds(" master ")), "master");
    }

    #[test]
    fn blank_commit_message_uses_default() {
        let mut options = SyncOptions {
            remote_url: "https://example.com/wiki.git".to_string(),
            credentials: creds("main"),
            commit_message: Some("  ".to_string()),
        };
        assert_eq!(options.message(), DEFAULT_SYNC_MESSAGE);

        options.commit_message = Some("Add journal entry".to_string());
        assert_eq!(options.message(), "Add journal entry");
    }

    #[test]
    fn combined_patch_separates_sections() {
        let snapshot = DiffSnapshot {
            unstaged: "a".to_string(),
            staged: "b".to_string(),
            untracked: Vec::new(),
        };
        assert_eq!(snapshot.combined_patch(), "a\nb");
    }

    #[test]
    fn empty_snapshot() {
        assert!(DiffSnapshot::default().is_empty());
        let with_untracked = DiffSnapshot {
            untracked: vec![PathBuf::from("tiddlers/New.tid")],
            ..DiffSnapshot::default()
        };
        assert!(!with_untracked.is_empty());
    }
}
