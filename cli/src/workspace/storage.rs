//! Workspace storage operations.
//!
//! This module provides persistence for workspace records:
//! - [`WorkspaceStore`] - Trait for workspace storage operations
//! - [`FileWorkspaceStore`] - JSON file-based storage implementation, one file per id

use std::fs;
use std::path::PathBuf;

use crate::config::paths::workspaces_dir;
use crate::error::Result;
use crate::workspace::error::WorkspaceError;
use crate::workspace::types::{NewWorkspace, Workspace};

/// Trait for workspace storage operations (enables swapping the backend in tests).
pub trait WorkspaceStore: Send + Sync {
    /// Loads a workspace by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or the record is corrupted.
    fn get(&self, id: &str) -> Result<Option<Workspace>>;

    /// Lists all workspaces, ordered by `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list(&self) -> Result<Vec<Workspace>>;

    /// Persists a new workspace and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn create(&self, config: NewWorkspace) -> Result<Workspace>;

    /// Overwrites an existing workspace record.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace does not exist or the write fails.
    fn update(&self, workspace: &Workspace) -> Result<()>;

    /// Removes a workspace record.
    ///
    /// Returns `true` if the workspace was removed, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn remove(&self, id: &str) -> Result<bool>;

    /// Resolves the main wiki a sub-wiki belongs to.
    ///
    /// A main wiki resolves to itself.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::MainWorkspaceNotFound`] for an orphaned sub-wiki.
    fn main_workspace(&self, workspace: &Workspace) -> Result<Workspace> {
        if !workspace.is_sub_wiki {
            return Ok(workspace.clone());
        }
        let main_id = workspace.main_wiki_id.clone().unwrap_or_default();
        self.get(&main_id)?.ok_or_else(|| {
            WorkspaceError::MainWorkspaceNotFound {
                sub: workspace.id.clone(),
                main: main_id,
            }
            .into()
        })
    }

    /// Lists the sub-wikis attached to a main wiki.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn sub_workspaces(&self, main_id: &str) -> Result<Vec<Workspace>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|ws| ws.is_sub_wiki && ws.main_wiki_id.as_deref() == Some(main_id))
            .collect())
    }

    /// Marks one workspace active and every other inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace does not exist or a write fails.
    fn set_active(&self, id: &str) -> Result<()> {
        let workspaces = self.list()?;
        if !workspaces.iter().any(|ws| ws.id == id) {
            return Err(WorkspaceError::NotFound(id.to_string()).into());
        }
        for mut ws in workspaces {
            let active = ws.id == id;
            if ws.active != active {
                ws.active = active;
                ws.touch();
                self.update(&ws)?;
            }
        }
        Ok(())
    }

    /// The workspace with the lowest `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn first(&self) -> Result<Option<Workspace>> {
        Ok(self.list()?.into_iter().next())
    }

    /// The currently active workspace, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn active(&self) -> Result<Option<Workspace>> {
        Ok(self.list()?.into_iter().find(|ws| ws.active))
    }
}

/// File-based workspace storage implementation.
pub struct FileWorkspaceStore {
    base_dir: PathBuf,
}

impl FileWorkspaceStore {
    /// Creates a new file-based workspace store.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspaces directory cannot be determined or created.
    pub fn new() -> Result<Self> {
        let base_dir = ensure_workspaces_dir()?;
        Ok(Self { base_dir })
    }

    /// Creates a store with a custom directory (for testing).
    #[cfg(test)]
    pub fn with_dir(base_dir: PathBuf) -> Result<Self> {
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
        }
        Ok(Self { base_dir })
    }

    /// Gets the file path for a workspace.
    fn workspace_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{id}.json"))
    }

    /// Validates a workspace id.
    fn validate_id(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(WorkspaceError::InvalidName(
                id.to_string(),
                "id cannot be empty".to_string(),
            )
            .into());
        }

        // Check for path traversal or invalid chars
        if id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(WorkspaceError::InvalidName(
                id.to_string(),
                "id cannot contain path separators".to_string(),
            )
            .into());
        }

        if id.len() > 100 {
            return Err(WorkspaceError::InvalidName(
                id.to_string(),
                "id too long (max 100 characters)".to_string(),
            )
            .into());
        }

        Ok(())
    }

    fn write(&self, workspace: &Workspace) -> Result<()> {
        let json = serde_json::to_string_pretty(workspace)?;
        fs::write(self.workspace_path(&workspace.id), json)?;
        Ok(())
    }
}

impl WorkspaceStore for FileWorkspaceStore {
    fn get(&self, id: &str) -> Result<Option<Workspace>> {
        Self::validate_id(id)?;

        let path = self.workspace_path(id);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let workspace: Workspace = serde_json::from_str(&contents)
            .map_err(|e| WorkspaceError::Corrupted(e.to_string()))?;

        Ok(Some(workspace))
    }

    fn list(&self) -> Result<Vec<Workspace>> {
        let mut workspaces = Vec::new();

        if !self.base_dir.exists() {
            return Ok(workspaces);
        }

        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                if let Ok(contents) = fs::read_to_string(&path) {
                    if let Ok(workspace) = serde_json::from_str::<Workspace>(&contents) {
                        workspaces.push(workspace);
                    }
                }
            }
        }

        workspaces.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));

        Ok(workspaces)
    }

    fn create(&self, config: NewWorkspace) -> Result<Workspace> {
        let order = self
            .list()?
            .iter()
            .map(|ws| ws.order + 1)
            .max()
            .unwrap_or(0);
        let workspace = config.into_workspace(order);

        if self.workspace_path(&workspace.id).exists() {
            return Err(WorkspaceError::AlreadyExists(workspace.id).into());
        }

        self.write(&workspace)?;
        Ok(workspace)
    }

    fn update(&self, workspace: &Workspace) -> Result<()> {
        Self::validate_id(&workspace.id)?;

        if !self.workspace_path(&workspace.id).exists() {
            return Err(WorkspaceError::NotFound(workspace.id.clone()).into());
        }

        self.write(workspace)
    }

    fn remove(&self, id: &str) -> Result<bool> {
        Self::validate_id(id)?;

        let path = self.workspace_path(id);

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path)?;
        Ok(true)
    }
}

/// Ensure the workspaces directory exists.
fn ensure_workspaces_dir() -> Result<PathBuf> {
    let dir = workspaces_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WikiError;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileWorkspaceStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileWorkspaceStore::with_dir(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, store)
    }

    fn new_wiki(name: &str) -> NewWorkspace {
        NewWorkspace::new(name, PathBuf::from(format!("/wikis/{name}")))
    }

    #[test]
    fn create_and_get_workspace() {
        let (_dir, store) = store();

        let created = store.create(new_wiki("notes")).unwrap();
        let loaded = store.get(&created.id).unwrap().unwrap();

        assert_eq!(loaded, created);
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let (_dir, store) = store();
        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn create_assigns_increasing_order() {
        let (_dir, store) = store();

        let a = store.create(new_wiki("a")).unwrap();
        let b = store.create(new_wiki("b")).unwrap();
        let c = store.create(new_wiki("c")).unwrap();

        assert!(a.order < b.order && b.order < c.order);
        let names: Vec<_> = store.list().unwrap().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn update_persists_changes() {
        let (_dir, store) = store();

        let mut ws = store.create(new_wiki("notes")).unwrap();
        ws.hibernated = true;
        store.update(&ws).unwrap();

        assert!(store.get(&ws.id).unwrap().unwrap().hibernated);
    }

    #[test]
    fn update_missing_workspace_fails() {
        let (_dir, store) = store();
        let ws = Workspace::new("ghost", PathBuf::from("/ghost"));

        let err = store.update(&ws).unwrap_err();
        assert!(matches!(err, WikiError::Workspace(WorkspaceError::NotFound(_))));
    }

    #[test]
    fn remove_workspace() {
        let (_dir, store) = store();
        let ws = store.create(new_wiki("to-delete")).unwrap();

        assert!(store.remove(&ws.id).unwrap());
        assert!(store.get(&ws.id).unwrap().is_none());
        assert!(!store.remove(&ws.id).unwrap());
    }

    #[test]
    fn set_active_is_exclusive() {
        let (_dir, store) = store();
        let a = store.create(new_wiki("a")).unwrap();
        let b = store.create(new_wiki("b")).unwrap();

        store.set_active(&a.id).unwrap();
        store.set_active(&b.id).unwrap();

        assert!(!store.get(&a.id).unwrap().unwrap().active);
        assert_eq!(store.active().unwrap().unwrap().id, b.id);
    }

    #[test]
    fn set_active_unknown_id_fails() {
        let (_dir, store) = store();
        assert!(store.set_active("missing").is_err());
    }

    #[test]
    fn first_is_lowest_order() {
        let (_dir, store) = store();
        assert!(store.first().unwrap().is_none());

        let a = store.create(new_wiki("a")).unwrap();
        store.create(new_wiki("b")).unwrap();

        assert_eq!(store.first().unwrap().unwrap().id, a.id);
    }

    #[test]
    fn sub_workspaces_and_main_lookup() {
        let (_dir, store) = store();
        let main = store.create(new_wiki("main")).unwrap();

        let mut sub_config = new_wiki("journal");
        sub_config.main_wiki_id = Some(main.id.clone());
        let sub = store.create(sub_config).unwrap();
        store.create(new_wiki("other")).unwrap();

        let subs = store.sub_workspaces(&main.id).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, sub.id);
        assert_eq!(store.main_workspace(&sub).unwrap().id, main.id);
        assert_eq!(store.main_workspace(&main).unwrap().id, main.id);
    }

    #[test]
    fn orphaned_sub_wiki_reports_missing_main() {
        let (_dir, store) = store();
        let mut sub_config = new_wiki("journal");
        sub_config.main_wiki_id = Some("gone".to_string());
        let sub = store.create(sub_config).unwrap();

        let err = store.main_workspace(&sub).unwrap_err();
        assert!(matches!(
            err,
            WikiError::Workspace(WorkspaceError::MainWorkspaceNotFound { .. })
        ));
    }

    #[test]
    fn reject_path_traversal() {
        let (_dir, store) = store();

        assert!(store.get("").is_err());
        assert!(store.get("../escape").is_err());
        assert!(store.get("foo/bar").is_err());
        assert!(store.get("foo\\bar").is_err());
        assert!(store.get(&"a".repeat(101)).is_err());
    }

    #[test]
    fn get_corrupted_json_returns_error() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("corrupted.json"), "{ invalid json }").unwrap();

        assert!(store.get("corrupted").is_err());
    }

    #[test]
    fn list_skips_invalid_json_files() {
        let (dir, store) = store();
        store.create(new_wiki("valid")).unwrap();
        std::fs::write(dir.path().join("invalid.json"), "not json").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "text file").unwrap();

        let list = store.list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "valid");
    }
}
