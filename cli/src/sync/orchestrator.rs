//! Per-workspace sync decision.
//!
//! [`SyncOrchestrator::sync_wiki_if_needed`] is the single entry point used by
//! interval ticks and manual syncs:
//! - Local wikis get a backup commit and never touch the network
//! - Remote wikis sync-or-force-pull, then cascade to their remote sub-wikis
//! - A change pulled from any remote triggers one restart and reload of the main wiki

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::auth::{CredentialProvider, GitUserInfo};
use crate::config::SharedPreferences;
use crate::error::Result;
use crate::git::{GitOperations, SyncOptions};
use crate::sync::commit_message::CommitMessageSynthesizer;
use crate::sync::DraftGate;
use crate::wiki::{ViewManager, WikiRuntime};
use crate::workspace::{Workspace, WorkspaceStore};

/// Message for commits of local-only wikis.
pub const LOCAL_BACKUP_MESSAGE: &str = "Local backup";

/// Advisory shown inside the wiki when drafts hold back a sync.
pub const DRAFT_BLOCK_MESSAGE: &str =
    "Sync skipped: this wiki has unsaved drafts. It will be retried on the next interval.";

/// Why a sync did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The workspace has no content to sync.
    NotAWiki,
    /// Another sync of the same workspace is running.
    InFlight,
    /// The wiki has drafts or unsaved edits.
    DraftsPending,
    /// A remote wiki lacks credentials or a remote URL.
    MissingCredentials,
}

/// What a sync call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing was attempted.
    Skipped(SkipReason),
    /// Local wiki; `committed` is false when the tree was clean.
    Committed {
        /// Whether a commit was created.
        committed: bool,
    },
    /// Remote wiki synced; `changed` is true if anything came from a remote.
    Synced {
        /// Whether local content changed.
        changed: bool,
    },
}

/// Something that can sync a workspace on demand.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WikiSyncer: Send + Sync {
    /// Syncs `workspace` if its settings and state allow it.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace's own git operation fails.
    async fn sync_wiki_if_needed(&self, workspace: &Workspace) -> Result<SyncOutcome>;
}

/// Decides and runs the sync for one workspace at a time.
pub struct SyncOrchestrator {
    store: Arc<dyn WorkspaceStore>,
    git: Arc<dyn GitOperations>,
    credentials: Arc<dyn CredentialProvider>,
    runtime: Arc<dyn WikiRuntime>,
    views: Arc<dyn ViewManager>,
    preferences: SharedPreferences,
    gate: DraftGate,
    synthesizer: Option<Arc<CommitMessageSynthesizer>>,
    in_flight: Mutex<HashSet<String>>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator without commit message generation.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        git: Arc<dyn GitOperations>,
        credentials: Arc<dyn CredentialProvider>,
        runtime: Arc<dyn WikiRuntime>,
        views: Arc<dyn ViewManager>,
        preferences: SharedPreferences,
    ) -> Self {
        Self {
            store,
            git,
            credentials,
            gate: DraftGate::new(Arc::clone(&runtime)),
            runtime,
            views,
            preferences,
            synthesizer: None,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Uses `synthesizer` for remote sync commit messages.
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<CommitMessageSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Claims `id` for the duration of the returned guard.
    fn begin(&self, id: &str) -> Option<InFlightGuard<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        set.insert(id.to_string()).then(|| InFlightGuard {
            set: &self.in_flight,
            id: id.to_string(),
        })
    }

    /// Remote URL, credentials and commit message for a remote wiki.
    async fn sync_options(&self, workspace: &Workspace) -> Option<SyncOptions> {
        let (remote_url, credentials) = remote_target(self.credentials.as_ref(), workspace)?;
        let commit_message = match &self.synthesizer {
            Some(synthesizer) => synthesizer.generate(&workspace.wiki_folder_location).await,
            None => None,
        };
        Some(SyncOptions {
            remote_url,
            credentials,
            commit_message,
        })
    }

    /// Syncs every remote sub-wiki of `main` concurrently. True if any changed.
    async fn cascade(&self, main: &Workspace) -> bool {
        let subs = match self.store.sub_workspaces(&main.id) {
            Ok(subs) => subs,
            Err(e) => {
                warn!(workspace = %main.id, error = %e, "Could not list sub-wikis");
                return false;
            }
        };

        let syncs = subs
            .iter()
            .filter(|sub| sub.is_wiki() && sub.is_remote())
            .map(|sub| async move {
                let Some(_guard) = self.begin(&sub.id) else {
                    debug!(workspace = %sub.id, "Sub-wiki already syncing, skipping");
                    return false;
                };
                let Some(options) = self.sync_options(sub).await else {
                    debug!(workspace = %sub.id, "Sub-wiki has no credentials or remote, skipping");
                    return false;
                };
                match self.git.sync_or_force_pull(sub, &options).await {
                    Ok(changed) => changed,
                    Err(e) => {
                        error!(workspace = %sub.id, error = %e, "Sub-wiki sync failed");
                        false
                    }
                }
            });

        join_all(syncs).await.contains(&true)
    }

    /// Restarts and reloads the wiki serving `workspace`, unless it watches its files.
    async fn reload(&self, workspace: &Workspace) {
        let owner = match self.store.main_workspace(workspace) {
            Ok(owner) => owner,
            Err(e) => {
                warn!(workspace = %workspace.id, error = %e, "Could not resolve wiki to reload");
                return;
            }
        };
        if owner.enable_file_system_watch {
            debug!(workspace = %owner.id, "File system watch picks up changes, not reloading");
            return;
        }

        info!(workspace = %owner.id, "Remote changes pulled, reloading wiki");
        if let Err(e) = self.runtime.restart(&owner.id).await {
            warn!(workspace = %owner.id, error = %e, "Wiki restart failed");
        }
        if let Err(e) = self.views.reload(&owner.id).await {
            warn!(workspace = %owner.id, error = %e, "View reload failed");
        }
    }
}

#[async_trait]
impl WikiSyncer for SyncOrchestrator {
    async fn sync_wiki_if_needed(&self, workspace: &Workspace) -> Result<SyncOutcome> {
        if !workspace.is_wiki() {
            warn!(workspace = %workspace.id, "Not a wiki workspace, nothing to sync");
            return Ok(SyncOutcome::Skipped(SkipReason::NotAWiki));
        }
        let Some(_guard) = self.begin(&workspace.id) else {
            debug!(workspace = %workspace.id, "Sync already running, skipping");
            return Ok(SyncOutcome::Skipped(SkipReason::InFlight));
        };

        let prefs = self.preferences.read().await.clone();
        if prefs.sync_only_when_no_draft {
            let runtime_id = workspace.runtime_id();
            let decision = self.gate.check(runtime_id, prefs.draft_check_fail_open).await;
            if decision.is_blocked() {
                info!(workspace = %workspace.id, "Drafts pending, sync skipped");
                if let Err(e) = self.runtime.notify(runtime_id, DRAFT_BLOCK_MESSAGE).await {
                    warn!(workspace = %runtime_id, error = %e, "Could not show draft notice");
                }
                return Ok(SyncOutcome::Skipped(SkipReason::DraftsPending));
            }
        }

        if !workspace.is_remote() {
            let committed = self
                .git
                .commit(&workspace.wiki_folder_location, LOCAL_BACKUP_MESSAGE)
                .await?;
            debug!(workspace = %workspace.id, committed, "Local backup done");
            return Ok(SyncOutcome::Committed { committed });
        }

        let Some(options) = self.sync_options(workspace).await else {
            debug!(workspace = %workspace.id, "No credentials or remote URL, skipping sync");
            return Ok(SyncOutcome::Skipped(SkipReason::MissingCredentials));
        };

        let mut changed = self.git.sync_or_force_pull(workspace, &options).await?;
        if !workspace.is_sub_wiki {
            changed |= self.cascade(workspace).await;
        }
        if changed {
            self.reload(workspace).await;
        }

        info!(workspace = %workspace.id, changed, "Wiki synced");
        Ok(SyncOutcome::Synced { changed })
    }
}

/// Removes its id from the in-flight set when dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Remote URL and usable credentials for a remote wiki, if both exist.
pub(crate) fn remote_target(
    credentials: &dyn CredentialProvider,
    workspace: &Workspace,
) -> Option<(String, GitUserInfo)> {
    let url = workspace
        .git_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())?
        .to_string();
    match credentials.user_info(workspace.storage_service) {
        Ok(info) => info.filter(GitUserInfo::is_usable).map(|info| (url, info)),
        Err(e) => {
            warn!(workspace = %workspace.id, error = %e, "Could not read credentials");
            None
        }
    }
}
