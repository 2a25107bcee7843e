//! Final best-effort sync before the process exits.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::auth::CredentialProvider;
use crate::client::Connectivity;
use crate::error::WikiError;
use crate::git::{GitOperations, SyncOptions};
use crate::sync::orchestrator::remote_target;
use crate::ui::Notifier;
use crate::workspace::{Workspace, WorkspaceStore};

/// Title of the notification shown before the flush.
pub const SHUTDOWN_NOTICE_TITLE: &str = "Syncing before shutdown";

/// Body of the notification shown before the flush.
pub const SHUTDOWN_NOTICE_BODY: &str =
    "Pushing unsaved wiki changes to their remotes before wikisync exits.";

/// Counts from one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Workspaces a commit-and-sync was started for.
    pub attempted: usize,
    /// Workspaces whose commit-and-sync succeeded.
    pub succeeded: usize,
}

/// Pushes every remote, awake wiki once, concurrently.
pub struct ShutdownFlush {
    store: Arc<dyn WorkspaceStore>,
    git: Arc<dyn GitOperations>,
    credentials: Arc<dyn CredentialProvider>,
    connectivity: Arc<dyn Connectivity>,
    notifier: Arc<dyn Notifier>,
}

impl ShutdownFlush {
    /// Creates a flush handler.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        git: Arc<dyn GitOperations>,
        credentials: Arc<dyn CredentialProvider>,
        connectivity: Arc<dyn Connectivity>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            git,
            credentials,
            connectivity,
            notifier,
        }
    }

    /// Runs the flush. Never fails; problems are logged.
    pub async fn flush(&self) -> FlushReport {
        if !self.connectivity.is_online().await {
            info!("Offline, skipping sync before shutdown");
            return FlushReport::default();
        }

        if let Err(e) = self
            .notifier
            .notify(SHUTDOWN_NOTICE_TITLE, SHUTDOWN_NOTICE_BODY)
            .await
        {
            warn!(error = %e, "Could not show shutdown notice");
        }

        let workspaces = match self.store.list() {
            Ok(workspaces) => workspaces,
            Err(e) => {
                error!(error = %e, "Could not list workspaces for shutdown sync");
                return FlushReport::default();
            }
        };

        let targets: Vec<(Workspace, SyncOptions)> = workspaces
            .into_iter()
            .filter(|ws| ws.is_wiki() && ws.is_remote() && !ws.hibernated)
            .filter_map(|ws| {
                let Some((remote_url, credentials)) = remote_target(self.credentials.as_ref(), &ws)
                else {
                    warn!(workspace = %ws.id, "No credentials or remote URL, not syncing before shutdown");
                    return None;
                };
                let options = SyncOptions {
                    remote_url,
                    credentials,
                    commit_message: None,
                };
                Some((ws, options))
            })
            .collect();

        let results = join_all(
            targets
                .iter()
                .map(|(ws, options)| self.sync_one(ws, options)),
        )
        .await;

        let report = FlushReport {
            attempted: results.len(),
            succeeded: results.iter().filter(|ok| **ok).count(),
        };
        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            "Sync before shutdown finished"
        );
        report
    }

    async fn sync_one(&self, workspace: &Workspace, options: &SyncOptions) -> bool {
        match self.git.commit_and_sync(workspace, options).await {
            Ok(()) => true,
            Err(WikiError::Git(e)) if e.is_conflict() => {
                warn!(
                    workspace = %workspace.id,
                    error = %e,
                    "Remote history diverged, left for the next sync"
                );
                false
            }
            Err(e) => {
                error!(workspace = %workspace.id, error = %e, "Sync before shutdown failed");
                false
            }
        }
    }
}
