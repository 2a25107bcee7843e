//! Command implementations.

pub mod auth;
pub mod sync;
pub mod workspace;

pub use auth::{handle_login, handle_logout};
pub use sync::{handle_commit_message, handle_flush, handle_sync, handle_watch};
pub use workspace::{handle_add, handle_completions, handle_list, handle_remove};

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{CredentialProvider, CredentialStore};
use crate::client::{HttpConnectivity, OpenAiCompatibleGenerator};
use crate::config::{load_config, SharedPreferences, WikiSyncConfig};
use crate::error::Result;
use crate::git::{Git2Operations, GitOperations};
use crate::sync::{CommitMessageSynthesizer, ShutdownFlush, SyncOrchestrator};
use crate::ui::{TerminalDialog, TerminalNotifier};
use crate::wiki::{HeadlessRuntime, HeadlessViews, ViewManager, WikiRuntime};
use crate::workspace::{
    FileWorkspaceStore, LocalFolderOps, Workspace, WorkspaceError, WorkspaceManager,
    WorkspaceStore,
};

/// Services shared by the command handlers, wired from the configuration.
pub struct Engine {
    pub config: WikiSyncConfig,
    pub preferences: SharedPreferences,
    pub store: Arc<dyn WorkspaceStore>,
    pub git: Arc<dyn GitOperations>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub runtime: Arc<dyn WikiRuntime>,
    pub views: Arc<dyn ViewManager>,
}

impl Engine {
    /// Loads the configuration and opens the workspace store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the data directory cannot be read.
    pub fn load() -> Result<Self> {
        let config = load_config()?;
        let store: Arc<dyn WorkspaceStore> = Arc::new(FileWorkspaceStore::new()?);
        Ok(Self {
            preferences: Arc::new(RwLock::new(config.preferences.clone())),
            config,
            runtime: Arc::new(HeadlessRuntime::new(Arc::clone(&store))),
            store,
            git: Arc::new(Git2Operations::new()),
            credentials: Arc::new(CredentialStore::new()),
            views: Arc::new(HeadlessViews::new()),
        })
    }

    /// Commit message synthesizer backed by the configured endpoint.
    pub fn synthesizer(&self) -> Result<Arc<CommitMessageSynthesizer>> {
        let generator = OpenAiCompatibleGenerator::new(&self.config.ai)?;
        Ok(Arc::new(CommitMessageSynthesizer::new(
            Arc::clone(&self.git),
            Arc::new(generator),
            Arc::clone(&self.preferences),
            self.config.ai.clone(),
        )))
    }

    /// Sync orchestrator with commit message generation.
    pub fn orchestrator(&self) -> Result<Arc<SyncOrchestrator>> {
        let orchestrator = SyncOrchestrator::new(
            Arc::clone(&self.store),
            Arc::clone(&self.git),
            Arc::clone(&self.credentials),
            Arc::clone(&self.runtime),
            Arc::clone(&self.views),
            Arc::clone(&self.preferences),
        )
        .with_synthesizer(self.synthesizer()?);
        Ok(Arc::new(orchestrator))
    }

    /// Create/remove transaction manager prompting on the terminal.
    pub fn manager(&self) -> WorkspaceManager {
        WorkspaceManager::new(
            Arc::clone(&self.store),
            Arc::clone(&self.git),
            Arc::new(LocalFolderOps::new()),
            Arc::clone(&self.runtime),
            Arc::clone(&self.views),
            Arc::new(TerminalDialog::new()),
        )
    }

    /// Shutdown flush probing the configured URL.
    pub fn shutdown_flush(&self) -> Result<ShutdownFlush> {
        Ok(ShutdownFlush::new(
            Arc::clone(&self.store),
            Arc::clone(&self.git),
            Arc::clone(&self.credentials),
            Arc::new(HttpConnectivity::new(&self.config.network)?),
            Arc::new(TerminalNotifier::new()),
        ))
    }

    /// Finds a workspace by id or display name.
    pub fn find_workspace(&self, key: &str) -> Result<Workspace> {
        find_workspace(self.store.as_ref(), key)
    }
}

/// Finds a workspace by id, falling back to an exact name match.
pub fn find_workspace(store: &dyn WorkspaceStore, key: &str) -> Result<Workspace> {
    let mut workspaces = store.list()?;
    let index = workspaces
        .iter()
        .position(|ws| ws.id == key)
        .or_else(|| workspaces.iter().position(|ws| ws.name == key))
        .ok_or_else(|| WorkspaceError::NotFound(key.to_string()))?;
    Ok(workspaces.swap_remove(index))
}
