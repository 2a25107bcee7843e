//! Transactional creation and removal of git-backed workspaces.
//!
//! Creation either leaves a fully initialized workspace behind or removes
//! everything it created. A failure to clean up is reported separately from
//! the failure that caused it.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::auth::GitUserInfo;
use crate::error::{Result, WikiError};
use crate::git::{GitOperations, InitOptions};
use crate::sync::IntervalScheduler;
use crate::ui::{Dialog, RemovalChoice};
use crate::wiki::{ViewManager, WikiRuntime};
use crate::workspace::{FolderOps, NewWorkspace, Workspace, WorkspaceError, WorkspaceStore};

/// Creates and removes workspaces together with their on-disk state.
pub struct WorkspaceManager {
    store: Arc<dyn WorkspaceStore>,
    git: Arc<dyn GitOperations>,
    folders: Arc<dyn FolderOps>,
    runtime: Arc<dyn WikiRuntime>,
    views: Arc<dyn ViewManager>,
    dialog: Arc<dyn Dialog>,
    scheduler: Option<Arc<IntervalScheduler>>,
}

impl WorkspaceManager {
    /// Creates a manager.
    #[must_use]
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        git: Arc<dyn GitOperations>,
        folders: Arc<dyn FolderOps>,
        runtime: Arc<dyn WikiRuntime>,
        views: Arc<dyn ViewManager>,
        dialog: Arc<dyn Dialog>,
    ) -> Self {
        Self {
            store,
            git,
            folders,
            runtime,
            views,
            dialog,
            scheduler: None,
        }
    }

    /// Cancels interval timers of removed workspaces through `scheduler`.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<IntervalScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Persists and activates a new workspace, then initializes its git tree.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::InitFailed`] if activation or initialization
    /// failed and was rolled back, or [`WorkspaceError::RevertFailed`] if the
    /// rollback failed too. Errors persisting the record itself are returned
    /// unchanged.
    pub async fn init_wiki_git_transaction(
        &self,
        config: NewWorkspace,
        credentials: Option<GitUserInfo>,
    ) -> Result<Workspace> {
        let workspace = self.store.create(config)?;

        if let Err(activate_error) = self.store.set_active(&workspace.id) {
            error!(
                workspace = %workspace.id,
                error = %activate_error,
                "Activation failed, removing workspace record"
            );
            // Nothing exists on disk yet, so only the record is undone.
            let cleanup = self.store.remove(&workspace.id).map(|_| ());
            self.ensure_active_workspace();
            return Err(rollback_error(&workspace, activate_error, cleanup));
        }

        if let Err(init_error) = self.init_git(&workspace, credentials).await {
            return Err(self.roll_back(&workspace, init_error).await);
        }

        info!(workspace = %workspace.id, name = %workspace.name, "Workspace created");
        Ok(self.store.get(&workspace.id)?.unwrap_or(workspace))
    }

    async fn init_git(
        &self,
        workspace: &Workspace,
        credentials: Option<GitUserInfo>,
    ) -> Result<()> {
        let path = &workspace.wiki_folder_location;
        if self.git.has_git(path).await {
            warn!(path = %path.display(), "Git repository already exists, skipping initialization");
            return Ok(());
        }

        let options = if workspace.is_remote() {
            let (Some(remote_url), Some(credentials)) = (workspace.git_url.clone(), credentials)
            else {
                return Err(WorkspaceError::NoGitUserInfo(workspace.name.clone()).into());
            };
            InitOptions {
                path: path.clone(),
                is_remote: true,
                is_main_wiki: !workspace.is_sub_wiki,
                remote_url: Some(remote_url),
                credentials: Some(credentials),
            }
        } else {
            InitOptions {
                path: path.clone(),
                is_remote: false,
                is_main_wiki: !workspace.is_sub_wiki,
                remote_url: None,
                credentials: None,
            }
        };
        self.git.init_wiki_git(&options).await?;

        if workspace.is_sub_wiki {
            let main = self.store.main_workspace(workspace)?;
            self.folders.attach_sub_wiki(&main, workspace).await?;
        }
        Ok(())
    }

    /// Undoes a failed creation and builds the error to report.
    async fn roll_back(&self, workspace: &Workspace, init_error: WikiError) -> WikiError {
        error!(
            workspace = %workspace.id,
            error = %init_error,
            "Git initialization failed, rolling back"
        );

        let cleanup = self.clean_up(workspace).await;
        rollback_error(workspace, init_error, cleanup)
    }

    async fn clean_up(&self, workspace: &Workspace) -> Result<()> {
        self.store.remove(&workspace.id)?;
        self.ensure_active_workspace();

        if workspace.is_sub_wiki {
            let main = self.store.main_workspace(workspace)?;
            self.folders.detach_sub_wiki(&main, workspace).await
        } else {
            self.folders
                .remove_wiki_folder(&workspace.wiki_folder_location)
                .await
        }
    }

    /// Asks for confirmation, then removes a workspace. Returns the choice taken.
    ///
    /// Every step after confirmation is best-effort and only logged on failure.
    pub async fn remove_workspace(&self, id: &str) -> RemovalChoice {
        let workspace = match self.store.get(id) {
            Ok(Some(workspace)) => workspace,
            Ok(None) => {
                warn!(workspace = %id, "No such workspace to remove");
                return RemovalChoice::Cancel;
            }
            Err(e) => {
                warn!(workspace = %id, error = %e, "Could not load workspace to remove");
                return RemovalChoice::Cancel;
            }
        };

        let choice = match self.dialog.confirm_removal(&workspace).await {
            Ok(choice) => choice,
            Err(e) => {
                warn!(workspace = %id, error = %e, "Removal prompt failed, cancelling");
                RemovalChoice::Cancel
            }
        };
        if choice == RemovalChoice::Cancel {
            return choice;
        }

        if let Err(e) = self.runtime.stop(id).await {
            warn!(workspace = %id, error = %e, "Could not stop wiki");
        }
        if let Some(scheduler) = &self.scheduler {
            scheduler.stop(id).await;
        }

        if workspace.is_sub_wiki {
            match self.store.main_workspace(&workspace) {
                Ok(main) => {
                    if let Err(e) = self.folders.detach_sub_wiki(&main, &workspace).await {
                        warn!(workspace = %id, error = %e, "Could not detach sub-wiki");
                    }
                }
                Err(e) => {
                    warn!(workspace = %id, error = %e, "Could not find main wiki to detach from");
                }
            }
        }
        if choice == RemovalChoice::RemoveAndDeleteFiles {
            if let Err(e) = self
                .folders
                .remove_wiki_folder(&workspace.wiki_folder_location)
                .await
            {
                warn!(workspace = %id, error = %e, "Could not delete wiki folder");
            }
        }

        if let Err(e) = self.views.remove(id).await {
            warn!(workspace = %id, error = %e, "Could not remove view");
        }
        if let Err(e) = self.store.remove(id) {
            warn!(workspace = %id, error = %e, "Could not remove workspace record");
        }
        self.ensure_active_workspace();

        info!(workspace = %id, name = %workspace.name, ?choice, "Workspace removed");
        choice
    }

    /// Activates the first workspace when none is active.
    fn ensure_active_workspace(&self) {
        let result = self.store.active().and_then(|active| {
            if active.is_some() {
                return Ok(());
            }
            match self.store.first()? {
                Some(first) => self.store.set_active(&first.id),
                None => Ok(()),
            }
        });
        if let Err(e) = result {
            warn!(error = %e, "Could not activate a workspace");
        }
    }
}

fn rollback_error(workspace: &Workspace, cause: WikiError, cleanup: Result<()>) -> WikiError {
    match cleanup {
        Ok(()) => WorkspaceError::InitFailed {
            name: workspace.name.clone(),
            source: Box::new(cause),
        }
        .into(),
        Err(cleanup_error) => {
            error!(workspace = %workspace.id, error = %cleanup_error, "Rollback failed");
            WorkspaceError::RevertFailed {
                name: workspace.name.clone(),
                init_error: Box::new(cause),
                source: Box::new(cleanup_error),
            }
            .into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StorageService;
    use crate::git::{GitError, MockGitOperations};
    use crate::ui::MockDialog;
    use crate::wiki::{MockViewManager, MockWikiRuntime};
    use crate::workspace::{FileWorkspaceStore, MockFolderOps};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        store: Arc<FileWorkspaceStore>,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = Arc::new(FileWorkspaceStore::with_dir(dir.path().to_path_buf()).unwrap());
            Self { _dir: dir, store }
        }

        fn manager(&self, git: MockGitOperations, folders: MockFolderOps) -> WorkspaceManager {
            WorkspaceManager::new(
                self.store.clone(),
                Arc::new(git),
                Arc::new(folders),
                Arc::new(MockWikiRuntime::new()),
                Arc::new(MockViewManager::new()),
                Arc::new(MockDialog::new()),
            )
        }

        fn remover(
            &self,
            choice: RemovalChoice,
            folders: MockFolderOps,
            runtime: MockWikiRuntime,
            views: MockViewManager,
        ) -> WorkspaceManager {
            let mut dialog = MockDialog::new();
            dialog.expect_confirm_removal().return_once(move |_| Ok(choice));
            WorkspaceManager::new(
                self.store.clone(),
                Arc::new(MockGitOperations::new()),
                Arc::new(folders),
                Arc::new(runtime),
                Arc::new(views),
                Arc::new(dialog),
            )
        }
    }

    fn creds() -> GitUserInfo {
        GitUserInfo {
            username: "octo".to_string(),
            email: "octo@example.com".to_string(),
            access_token: "token".to_string(),
            branch: "main".to_string(),
        }
    }

    fn remote_config(name: &str) -> NewWorkspace {
        let mut config = NewWorkspace::new(name, PathBuf::from(format!("/wikis/{name}")));
        config.storage_service = StorageService::GitHub;
        config.git_url = Some(format!("https://github.com/octo/{name}.git"));
        config
    }

    fn stopping_runtime() -> MockWikiRuntime {
        let mut runtime = MockWikiRuntime::new();
        runtime.expect_stop().times(1).returning(|_| Ok(()));
        runtime
    }

    fn removing_views() -> MockViewManager {
        let mut views = MockViewManager::new();
        views.expect_remove().times(1).returning(|_| Ok(()));
        views
    }

    #[tokio::test]
    async fn create_local_wiki_initializes_git_and_activates() {
        let h = Harness::new();
        let old = h
            .store
            .create(NewWorkspace::new("old", PathBuf::from("/wikis/old")))
            .unwrap();
        h.store.set_active(&old.id).unwrap();

        let mut git = MockGitOperations::new();
        git.expect_has_git().return_const(false);
        git.expect_init_wiki_git()
            .withf(|options| !options.is_remote && options.is_main_wiki)
            .times(1)
            .returning(|_| Ok(()));

        let ws = h
            .manager(git, MockFolderOps::new())
            .init_wiki_git_transaction(NewWorkspace::new("notes", PathBuf::from("/wikis/notes")), None)
            .await
            .unwrap();

        assert!(ws.active);
        assert!(!h.store.get(&old.id).unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn existing_repository_skips_initialization() {
        let h = Harness::new();
        let mut git = MockGitOperations::new();
        git.expect_has_git().return_const(true);
        git.expect_init_wiki_git().never();

        let ws = h
            .manager(git, MockFolderOps::new())
            .init_wiki_git_transaction(remote_config("wiki"), None)
            .await
            .unwrap();

        assert!(h.store.get(&ws.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn remote_wiki_without_credentials_rolls_back() {
        let h = Harness::new();
        let mut git = MockGitOperations::new();
        git.expect_has_git().return_const(false);
        git.expect_init_wiki_git().never();
        let mut folders = MockFolderOps::new();
        folders
            .expect_remove_wiki_folder()
            .withf(|path| path == Path::new("/wikis/wiki"))
            .times(1)
            .returning(|_| Ok(()));

        let err = h
            .manager(git, folders)
            .init_wiki_git_transaction(remote_config("wiki"), None)
            .await
            .unwrap_err();

        match err {
            WikiError::Workspace(WorkspaceError::InitFailed { source, .. }) => assert!(matches!(
                *source,
                WikiError::Workspace(WorkspaceError::NoGitUserInfo(_))
            )),
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn init_failure_removes_record_and_main_folder() {
        let h = Harness::new();
        let mut git = MockGitOperations::new();
        git.expect_has_git().return_const(false);
        git.expect_init_wiki_git()
            .withf(|options| options.is_remote && options.credentials.is_some())
            .returning(|_| Err(GitError::Network("unreachable".to_string()).into()));
        let mut folders = MockFolderOps::new();
        folders
            .expect_remove_wiki_folder()
            .withf(|path| path == Path::new("/wikis/wiki"))
            .times(1)
            .returning(|_| Ok(()));

        let err = h
            .manager(git, folders)
            .init_wiki_git_transaction(remote_config("wiki"), Some(creds()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WikiError::Workspace(WorkspaceError::InitFailed { .. })
        ));
        assert!(err.to_string().contains("unreachable"));
        assert!(h.store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_cleanup_surfaces_revert_failure() {
        let h = Harness::new();
        let mut git = MockGitOperations::new();
        git.expect_has_git().return_const(false);
        git.expect_init_wiki_git()
            .returning(|_| Err(GitError::Git2("index locked".to_string()).into()));
        let mut folders = MockFolderOps::new();
        folders
            .expect_remove_wiki_folder()
            .returning(|_| Err(std::io::Error::other("device busy").into()));

        let err = h
            .manager(git, folders)
            .init_wiki_git_transaction(NewWorkspace::new("notes", PathBuf::from("/wikis/notes")), None)
            .await
            .unwrap_err();

        let WikiError::Workspace(ws_err) = err else {
            panic!("expected a workspace error");
        };
        assert!(ws_err.is_revert_failure());
        let message = ws_err.to_string();
        assert!(message.contains("index locked"));
        assert!(message.contains("device busy"));
    }

    /// Delegates to a file store but refuses to change the active workspace.
    struct LockedActivation(FileWorkspaceStore);

    impl WorkspaceStore for LockedActivation {
        fn get(&self, id: &str) -> Result<Option<Workspace>> {
            self.0.get(id)
        }

        fn list(&self) -> Result<Vec<Workspace>> {
            self.0.list()
        }

        fn create(&self, config: NewWorkspace) -> Result<Workspace> {
            self.0.create(config)
        }

        fn update(&self, workspace: &Workspace) -> Result<()> {
            self.0.update(workspace)
        }

        fn remove(&self, id: &str) -> Result<bool> {
            self.0.remove(id)
        }

        fn set_active(&self, _id: &str) -> Result<()> {
            Err(std::io::Error::other("store is read-only").into())
        }
    }

    #[tokio::test]
    async fn activation_failure_removes_record_without_touching_disk() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LockedActivation(
            FileWorkspaceStore::with_dir(dir.path().to_path_buf()).unwrap(),
        ));
        let mut git = MockGitOperations::new();
        git.expect_has_git().never();
        git.expect_init_wiki_git().never();
        let mut folders = MockFolderOps::new();
        folders.expect_remove_wiki_folder().never();
        folders.expect_attach_sub_wiki().never();
        let manager = WorkspaceManager::new(
            store.clone(),
            Arc::new(git),
            Arc::new(folders),
            Arc::new(MockWikiRuntime::new()),
            Arc::new(MockViewManager::new()),
            Arc::new(MockDialog::new()),
        );

        let err = manager
            .init_wiki_git_transaction(NewWorkspace::new("notes", PathBuf::from("/wikis/notes")), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WikiError::Workspace(WorkspaceError::InitFailed { .. })
        ));
        assert!(err.to_string().contains("read-only"));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sub_wiki_init_failure_detaches_instead_of_deleting() {
        let h = Harness::new();
        let main = h
            .store
            .create(NewWorkspace::new("main", PathBuf::from("/wikis/main")))
            .unwrap();
        let mut config = remote_config("journal");
        config.main_wiki_id = Some(main.id.clone());

        let mut git = MockGitOperations::new();
        git.expect_has_git().return_const(false);
        git.expect_init_wiki_git()
            .withf(|options| !options.is_main_wiki)
            .returning(|_| Err(GitError::Network("timeout".to_string()).into()));
        let mut folders = MockFolderOps::new();
        folders.expect_remove_wiki_folder().never();
        let main_id = main.id.clone();
        folders
            .expect_detach_sub_wiki()
            .withf(move |m, s| m.id == main_id && s.name == "journal")
            .times(1)
            .returning(|_, _| Ok(()));

        let err = h
            .manager(git, folders)
            .init_wiki_git_transaction(config, Some(creds()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WikiError::Workspace(WorkspaceError::InitFailed { .. })
        ));
        assert_eq!(h.store.list().unwrap().len(), 1);
        assert!(h.store.get(&main.id).unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn sub_wiki_creation_attaches_to_main() {
        let h = Harness::new();
        let main = h
            .store
            .create(NewWorkspace::new("main", PathBuf::from("/wikis/main")))
            .unwrap();
        let mut config = NewWorkspace::new("journal", PathBuf::from("/wikis/journal"));
        config.main_wiki_id = Some(main.id.clone());
        config.tag_name = Some("Journal".to_string());

        let mut git = MockGitOperations::new();
        git.expect_has_git().return_const(false);
        git.expect_init_wiki_git().returning(|_| Ok(()));
        let mut folders = MockFolderOps::new();
        folders
            .expect_attach_sub_wiki()
            .times(1)
            .returning(|_, _| Ok(()));

        let sub = h
            .manager(git, folders)
            .init_wiki_git_transaction(config, None)
            .await
            .unwrap();

        assert!(sub.is_sub_wiki);
    }

    #[tokio::test]
    async fn cancel_changes_nothing() {
        let h = Harness::new();
        let ws = h
            .store
            .create(NewWorkspace::new("notes", PathBuf::from("/wikis/notes")))
            .unwrap();

        let mut runtime = MockWikiRuntime::new();
        runtime.expect_stop().never();
        let choice = h
            .remover(RemovalChoice::Cancel, MockFolderOps::new(), runtime, MockViewManager::new())
            .remove_workspace(&ws.id)
            .await;

        assert_eq!(choice, RemovalChoice::Cancel);
        assert!(h.store.get(&ws.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_reference_keeps_files() {
        let h = Harness::new();
        let ws = h
            .store
            .create(NewWorkspace::new("notes", PathBuf::from("/wikis/notes")))
            .unwrap();
        let mut folders = MockFolderOps::new();
        folders.expect_remove_wiki_folder().never();

        let choice = h
            .remover(RemovalChoice::RemoveReference, folders, stopping_runtime(), removing_views())
            .remove_workspace(&ws.id)
            .await;

        assert_eq!(choice, RemovalChoice::RemoveReference);
        assert!(h.store.get(&ws.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_and_delete_continues_past_failures() {
        let h = Harness::new();
        let ws = h
            .store
            .create(NewWorkspace::new("notes", PathBuf::from("/wikis/notes")))
            .unwrap();
        let other = h
            .store
            .create(NewWorkspace::new("other", PathBuf::from("/wikis/other")))
            .unwrap();
        h.store.set_active(&ws.id).unwrap();

        let mut runtime = MockWikiRuntime::new();
        runtime
            .expect_stop()
            .returning(|id| Err(WikiError::runtime(id, "already stopped")));
        let mut folders = MockFolderOps::new();
        folders
            .expect_remove_wiki_folder()
            .withf(|path| path == Path::new("/wikis/notes"))
            .times(1)
            .returning(|_| Ok(()));

        let choice = h
            .remover(RemovalChoice::RemoveAndDeleteFiles, folders, runtime, removing_views())
            .remove_workspace(&ws.id)
            .await;

        assert_eq!(choice, RemovalChoice::RemoveAndDeleteFiles);
        assert!(h.store.get(&ws.id).unwrap().is_none());
        assert!(h.store.get(&other.id).unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn removing_sub_wiki_always_detaches() {
        let h = Harness::new();
        let main = h
            .store
            .create(NewWorkspace::new("main", PathBuf::from("/wikis/main")))
            .unwrap();
        let mut config = NewWorkspace::new("journal", PathBuf::from("/wikis/journal"));
        config.main_wiki_id = Some(main.id.clone());
        let sub = h.store.create(config).unwrap();

        let mut folders = MockFolderOps::new();
        folders
            .expect_detach_sub_wiki()
            .times(1)
            .returning(|_, _| Err(std::io::Error::other("link busy").into()));
        folders.expect_remove_wiki_folder().never();

        let choice = h
            .remover(RemovalChoice::RemoveReference, folders, stopping_runtime(), removing_views())
            .remove_workspace(&sub.id)
            .await;

        assert_eq!(choice, RemovalChoice::RemoveReference);
        assert!(h.store.get(&sub.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_sub_wiki_detaches_and_removes_its_folder() {
        let h = Harness::new();
        let main = h
            .store
            .create(NewWorkspace::new("main", PathBuf::from("/wikis/main")))
            .unwrap();
        let mut config = NewWorkspace::new("journal", PathBuf::from("/wikis/journal"));
        config.main_wiki_id = Some(main.id.clone());
        let sub = h.store.create(config).unwrap();

        let main_id = main.id.clone();
        let mut folders = MockFolderOps::new();
        folders
            .expect_detach_sub_wiki()
            .withf(move |main, sub| main.id == main_id && sub.name == "journal")
            .times(1)
            .returning(|_, _| Ok(()));
        folders
            .expect_remove_wiki_folder()
            .withf(|path| path == Path::new("/wikis/journal"))
            .times(1)
            .returning(|_| Ok(()));

        let choice = h
            .remover(
                RemovalChoice::RemoveAndDeleteFiles,
                folders,
                stopping_runtime(),
                removing_views(),
            )
            .remove_workspace(&sub.id)
            .await;

        assert_eq!(choice, RemovalChoice::RemoveAndDeleteFiles);
        assert!(h.store.get(&sub.id).unwrap().is_none());
        assert!(h.store.get(&main.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn removal_cancels_interval_timer() {
        use crate::config::Preferences;
        use crate::sync::orchestrator::MockWikiSyncer;
        use tokio::sync::RwLock;

        let h = Harness::new();
        let ws = h
            .store
            .create(NewWorkspace::new("notes", PathBuf::from("/wikis/notes")))
            .unwrap();
        let scheduler = Arc::new(IntervalScheduler::new(
            Arc::new(MockWikiSyncer::new()),
            h.store.clone(),
            Arc::new(RwLock::new(Preferences::default())),
        ));
        scheduler.start(&ws).await;
        assert!(scheduler.is_scheduled(&ws.id).await);

        let manager = h
            .remover(
                RemovalChoice::RemoveReference,
                MockFolderOps::new(),
                stopping_runtime(),
                removing_views(),
            )
            .with_scheduler(Arc::clone(&scheduler));
        manager.remove_workspace(&ws.id).await;

        assert!(!scheduler.is_scheduled(&ws.id).await);
    }

    #[tokio::test]
    async fn removing_unknown_workspace_cancels() {
        let h = Harness::new();
        let mut dialog = MockDialog::new();
        dialog.expect_confirm_removal().never();
        let manager = WorkspaceManager::new(
            h.store.clone(),
            Arc::new(MockGitOperations::new()),
            Arc::new(MockFolderOps::new()),
            Arc::new(MockWikiRuntime::new()),
            Arc::new(MockViewManager::new()),
            Arc::new(dialog),
        );

        assert_eq!(manager.remove_workspace("missing").await, RemovalChoice::Cancel);
    }
}
