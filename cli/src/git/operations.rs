//! Git operations abstraction for wikisync.
//!
//! This module provides a trait-based abstraction over the git capability the
//! sync engine consumes:
//! - [`GitOperations`] - Async trait for init, commit, sync and diff
//! - [`Git2Operations`] - Implementation using the git2 (libgit2) library
//!
//! libgit2 is blocking, so every call runs on tokio's blocking pool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use git2::build::CheckoutBuilder;
use git2::{
    Commit, Cred, Diff, DiffFormat, ErrorCode, FetchOptions, IndexAddOption, Oid, PushOptions,
    RemoteCallbacks, Repository, RepositoryInitOptions, ResetType, Signature, StatusOptions,
};
use tracing::{debug, info, warn};

use crate::auth::GitUserInfo;
use crate::error::Result;
use crate::git::error::GitError;
use crate::git::types::{
    branch_or_default, DiffSnapshot, InitOptions, SyncOptions, DEFAULT_BRANCH, ORIGIN,
};
use crate::workspace::Workspace;

type GitResult<T> = std::result::Result<T, GitError>;

/// Trait for the git capability (enables mocking in tests).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitOperations: Send + Sync {
    /// Returns true if `path` holds a git working tree.
    async fn has_git(&self, path: &Path) -> bool;

    /// Initializes a wiki's repository, optionally wiring it to a remote.
    ///
    /// # Errors
    ///
    /// Returns an error if init, the initial commit or the first remote contact fails.
    async fn init_wiki_git(&self, options: &InitOptions) -> Result<()>;

    /// Commits every change in the working tree without contacting a remote.
    ///
    /// Returns `true` if a commit was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a repository or the commit fails.
    async fn commit(&self, path: &Path, message: &str) -> Result<bool>;

    /// Commits local changes and reconciles with the remote, failing on conflicts.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures or unreconcilable history.
    async fn commit_and_sync(&self, workspace: &Workspace, options: &SyncOptions) -> Result<()>;

    /// Commits local changes and reconciles with the remote, force-pulling on
    /// conflicts.
    ///
    /// Returns `true` if the working tree content changed because of the remote.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures.
    async fn sync_or_force_pull(&self, workspace: &Workspace, options: &SyncOptions)
        -> Result<bool>;

    /// Collects unstaged, staged and untracked changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a repository.
    async fn diff_snapshot(&self, path: &Path) -> Result<DiffSnapshot>;
}

/// Git operations implementation using git2 library.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Operations;

impl Git2Operations {
    /// Creates the libgit2-backed implementation.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> GitResult<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

#[async_trait]
impl GitOperations for Git2Operations {
    async fn has_git(&self, path: &Path) -> bool {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Repository::open(&path).is_ok())
            .await
            .unwrap_or(false)
    }

    async fn init_wiki_git(&self, options: &InitOptions) -> Result<()> {
        let options = options.clone();
        blocking(move || init_blocking(&options)).await
    }

    async fn commit(&self, path: &Path, message: &str) -> Result<bool> {
        let path = path.to_path_buf();
        let message = message.to_string();
        blocking(move || {
            let repo = open(&path)?;
            commit_all(&repo, &message, None)
        })
        .await
    }

    async fn commit_and_sync(&self, workspace: &Workspace, options: &SyncOptions) -> Result<()> {
        let path = workspace.wiki_folder_location.clone();
        let options = options.clone();
        blocking(move || sync_blocking(&path, &options, SyncMode::CommitAndSync).map(|_| ())).await
    }

    async fn sync_or_force_pull(
        &self,
        workspace: &Workspace,
        options: &SyncOptions,
    ) -> Result<bool> {
        let path = workspace.wiki_folder_location.clone();
        let options = options.clone();
        blocking(move || sync_blocking(&path, &options, SyncMode::SyncOrForcePull)).await
    }

    async fn diff_snapshot(&self, path: &Path) -> Result<DiffSnapshot> {
        let path = path.to_path_buf();
        blocking(move || diff_blocking(&path)).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncMode {
    CommitAndSync,
    SyncOrForcePull,
}

/// A working tree file captured before a sync; `None` content means deleted.
struct PendingFile {
    path: PathBuf,
    content: Option<Vec<u8>>,
}

fn open(path: &Path) -> GitResult<Repository> {
    Repository::open(path).map_err(|_| GitError::NotARepository)
}

fn init_blocking(options: &InitOptions) -> GitResult<()> {
    std::fs::create_dir_all(&options.path)?;

    let branch = options
        .credentials
        .as_ref()
        .map_or(DEFAULT_BRANCH, branch_or_default);

    let mut init_opts = RepositoryInitOptions::new();
    init_opts.initial_head(branch);
    let repo = Repository::init_opts(&options.path, &init_opts)?;
    info!(path = %options.path.display(), branch, "initialized wiki repository");

    if !options.is_remote {
        commit_initial(&repo, None)?;
        return Ok(());
    }

    let url = options.remote_url.as_deref().ok_or(GitError::MissingRemote)?;
    let credentials = options
        .credentials
        .as_ref()
        .ok_or(GitError::MissingCredentials)?;
    ensure_remote(&repo, url)?;

    if options.is_main_wiki {
        commit_initial(&repo, Some(credentials))?;
        drop(repo);
        let sync = SyncOptions {
            remote_url: url.to_string(),
            credentials: credentials.clone(),
            commit_message: None,
        };
        sync_blocking(&options.path, &sync, SyncMode::CommitAndSync)?;
        return Ok(());
    }

    // Sub-wikis take their content from the remote and never push on creation.
    fetch(&repo, credentials)?;
    let remote_ref = format!("refs/remotes/{ORIGIN}/{branch}");
    if let Ok(remote) = repo.refname_to_id(&remote_ref) {
        let local_ref = format!("refs/heads/{branch}");
        repo.reference(&local_ref, remote, true, "wikisync: initial fetch")?;
        repo.set_head(&local_ref)?;
        repo.checkout_head(Some(CheckoutBuilder::new().safe()))?;
        debug!(path = %options.path.display(), "checked out fetched sub-wiki content");
    }
    Ok(())
}

fn sync_blocking(path: &Path, options: &SyncOptions, mode: SyncMode) -> GitResult<bool> {
    let repo = open(path)?;
    ensure_remote(&repo, &options.remote_url)?;

    let credentials = &options.credentials;
    let message = options.message();
    let pending = uncommitted_files(&repo)?;
    if commit_all(&repo, message, Some(credentials))? {
        debug!(path = %path.display(), files = pending.len(), "committed local changes");
    }
    fetch(&repo, credentials)?;

    let local_branch = head_branch(&repo)?;
    let remote_branch = options.remote_branch();
    let local_ref = format!("refs/heads/{local_branch}");
    let local = repo.refname_to_id(&local_ref).ok();
    let remote = repo
        .refname_to_id(&format!("refs/remotes/{ORIGIN}/{remote_branch}"))
        .ok();

    match (local, remote) {
        (None, None) => Ok(false),
        (Some(_), None) => {
            push(&repo, &local_branch, remote_branch, credentials)?;
            Ok(false)
        }
        (None, Some(remote)) => {
            fast_forward(&repo, &local_ref, remote)?;
            Ok(true)
        }
        (Some(local), Some(remote)) if local == remote => Ok(false),
        (Some(local), Some(remote)) => {
            let (ahead, behind) = repo.graph_ahead_behind(local, remote)?;
            if behind == 0 {
                push(&repo, &local_branch, remote_branch, credentials)?;
                Ok(false)
            } else if ahead == 0 {
                fast_forward(&repo, &local_ref, remote)?;
                Ok(true)
            } else if merge_remote(&repo, local, remote, credentials)? {
                push(&repo, &local_branch, remote_branch, credentials)?;
                Ok(true)
            } else {
                match mode {
                    SyncMode::CommitAndSync => Err(GitError::Conflict(format!(
                        "local branch '{local_branch}' and '{ORIGIN}/{remote_branch}' have diverged"
                    ))),
                    SyncMode::SyncOrForcePull => {
                        warn!(path = %path.display(), "history diverged with conflicts, force pulling");
                        if force_pull(&repo, remote, &pending, message, credentials)? {
                            push(&repo, &local_branch, remote_branch, credentials)?;
                        }
                        Ok(true)
                    }
                }
            }
        }
    }
}

fn diff_blocking(path: &Path) -> GitResult<DiffSnapshot> {
    let repo = open(path)?;

    let unstaged = repo.diff_index_to_workdir(None, None)?;
    let head_tree = match repo.head() {
        Ok(head) => Some(head.peel_to_tree()?),
        Err(e) if is_unborn(&e) => None,
        Err(e) => return Err(e.into()),
    };
    let staged = repo.diff_tree_to_index(head_tree.as_ref(), None, None)?;

    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let untracked = repo
        .statuses(Some(&mut opts))?
        .iter()
        .filter(|entry| entry.status().is_wt_new())
        .filter_map(|entry| entry.path().map(PathBuf::from))
        .collect();

    Ok(DiffSnapshot {
        unstaged: patch_text(&unstaged)?,
        staged: patch_text(&staged)?,
        untracked,
    })
}

fn patch_text(diff: &Diff<'_>) -> GitResult<String> {
    let mut out = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            out.push(line.origin());
        }
        out.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(out)
}

fn is_unborn(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

fn signature(repo: &Repository, credentials: Option<&GitUserInfo>) -> GitResult<Signature<'static>> {
    if let Some(c) = credentials {
        if !c.username.is_empty() && !c.email.is_empty() {
            return Ok(Signature::now(&c.username, &c.email)?);
        }
    }
    Ok(repo
        .signature()
        .or_else(|_| Signature::now("wikisync", "wikisync@localhost"))?)
}

/// Stages everything (including deletions) and commits if the tree changed.
///
/// An empty tree on an unborn branch is not committed, so a fresh clone can
/// fast-forward onto the remote instead of merging an unrelated root.
fn commit_all(
    repo: &Repository,
    message: &str,
    credentials: Option<&GitUserInfo>,
) -> GitResult<bool> {
    commit_tree(repo, message, credentials, false)
}

/// Root commit for a freshly initialized wiki, even when the folder is empty.
fn commit_initial(repo: &Repository, credentials: Option<&GitUserInfo>) -> GitResult<bool> {
    commit_tree(repo, "Initial commit", credentials, true)
}

fn commit_tree(
    repo: &Repository,
    message: &str,
    credentials: Option<&GitUserInfo>,
    allow_empty_root: bool,
) -> GitResult<bool> {
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"].iter(), None)?;
    index.write()?;
    let tree_id = index.write_tree()?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(e) if is_unborn(&e) => None,
        Err(e) => return Err(e.into()),
    };
    match &parent {
        Some(p) if p.tree_id() == tree_id => return Ok(false),
        None if !allow_empty_root && index.is_empty() => return Ok(false),
        _ => {}
    }

    let tree = repo.find_tree(tree_id)?;
    let sig = signature(repo, credentials)?;
    let parents: Vec<&Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
    Ok(true)
}

fn uncommitted_files(repo: &Repository) -> GitResult<Vec<PendingFile>> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| GitError::Git2("Bare repository not supported".to_string()))?
        .to_path_buf();

    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);

    let mut files = Vec::new();
    for entry in repo.statuses(Some(&mut opts))?.iter() {
        let status = entry.status();
        if status.is_ignored() {
            continue;
        }
        let Some(path) = entry.path() else {
            continue;
        };
        let path = PathBuf::from(path);
        let content = if status.is_wt_deleted() || status.is_index_deleted() {
            None
        } else {
            match std::fs::read(workdir.join(&path)) {
                Ok(bytes) => Some(bytes),
                Err(_) => continue,
            }
        };
        files.push(PendingFile { path, content });
    }
    Ok(files)
}

/// Branch HEAD points at, even when it has no commits yet.
fn head_branch(repo: &Repository) -> GitResult<String> {
    let head = repo.find_reference("HEAD")?;
    let target = head
        .symbolic_target()
        .ok_or_else(|| GitError::Git2("HEAD is detached".to_string()))?;
    Ok(target.trim_start_matches("refs/heads/").to_string())
}

fn ensure_remote(repo: &Repository, url: &str) -> GitResult<()> {
    match repo.find_remote(ORIGIN) {
        Ok(remote) => {
            if remote.url() != Some(url) {
                repo.remote_set_url(ORIGIN, url)?;
            }
        }
        Err(_) => {
            repo.remote(ORIGIN, url)?;
        }
    }
    Ok(())
}

fn remote_callbacks(credentials: &GitUserInfo) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username_from_url, _allowed| {
        Cred::userpass_plaintext(&credentials.username, &credentials.access_token)
    });
    callbacks
}

fn fetch(repo: &Repository, credentials: &GitUserInfo) -> GitResult<()> {
    let mut remote = repo.find_remote(ORIGIN)?;
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks(credentials));
    remote.fetch::<&str>(&[], Some(&mut options), None)?;
    Ok(())
}

fn push(
    repo: &Repository,
    local_branch: &str,
    remote_branch: &str,
    credentials: &GitUserInfo,
) -> GitResult<()> {
    let mut remote = repo.find_remote(ORIGIN)?;
    let mut callbacks = remote_callbacks(credentials);
    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::new(
            ErrorCode::NotFastForward,
            git2::ErrorClass::Reference,
            format!("push of {refname} rejected: {message}"),
        )),
        None => Ok(()),
    });
    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);

    let refspec = format!("refs/heads/{local_branch}:refs/heads/{remote_branch}");
    remote.push(&[refspec.as_str()], Some(&mut options))?;
    debug!(local_branch, remote_branch, "pushed to remote");
    Ok(())
}

fn fast_forward(repo: &Repository, local_ref: &str, target: Oid) -> GitResult<()> {
    repo.reference(local_ref, target, true, "wikisync: fast-forward")?;
    repo.set_head(local_ref)?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
    Ok(())
}

/// Merges the remote into HEAD; returns `false` if the merge has conflicts.
fn merge_remote(
    repo: &Repository,
    local: Oid,
    remote: Oid,
    credentials: &GitUserInfo,
) -> GitResult<bool> {
    let local_commit = repo.find_commit(local)?;
    let remote_commit = repo.find_commit(remote)?;

    let mut index = repo.merge_commits(&local_commit, &remote_commit, None)?;
    if index.has_conflicts() {
        return Ok(false);
    }

    let tree_id = index.write_tree_to(repo)?;
    let tree = repo.find_tree(tree_id)?;
    let sig = signature(repo, Some(credentials))?;
    repo.commit(
        Some("HEAD"),
        &sig,
        &sig,
        "Merge remote changes",
        &tree,
        &[&local_commit, &remote_commit],
    )?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
    Ok(true)
}

/// Resets to the remote, then re-applies files that were uncommitted when the
/// sync started. Returns `true` if re-applying produced a new commit.
fn force_pull(
    repo: &Repository,
    remote: Oid,
    pending: &[PendingFile],
    message: &str,
    credentials: &GitUserInfo,
) -> GitResult<bool> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| GitError::Git2("Bare repository not supported".to_string()))?
        .to_path_buf();

    let target = repo.find_object(remote, None)?;
    repo.reset(&target, ResetType::Hard, None)?;

    for file in pending {
        let absolute = workdir.join(&file.path);
        match &file.content {
            Some(bytes) => {
                if let Some(parent) = absolute.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&absolute, bytes)?;
            }
            None => {
                if absolute.exists() {
                    std::fs::remove_file(&absolute)?;
                }
            }
        }
    }

    commit_all(repo, message, Some(credentials))
}
