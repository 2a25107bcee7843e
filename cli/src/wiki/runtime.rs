//! Content runtime seam and a filesystem-backed headless implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, WikiError};
use crate::workspace::{WorkspaceError, WorkspaceStore};

/// Server-side filter listing every draft tiddler.
pub const DRAFT_FILTER: &str = "[all[]is[draft]]";

/// Field that marks a tiddler file as a draft.
const DRAFT_FIELD: &str = "draft.of";

/// Operations on the content engine serving a workspace.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WikiRuntime: Send + Sync {
    /// Evaluates a filter in the server-side engine and returns matching titles.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime is unavailable or the filter is unsupported.
    async fn run_filter(&self, workspace_id: &str, filter: &str) -> Result<Vec<String>>;

    /// Titles with an edit field that hasn't been saved, as seen by the rendered view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view could not be queried.
    async fn unsaved_edit_titles(&self, workspace_id: &str) -> Result<Vec<String>>;

    /// Shows an advisory message inside the wiki.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be delivered.
    async fn notify(&self, workspace_id: &str, message: &str) -> Result<()>;

    /// Restarts the engine so it picks up content changed on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine failed to restart.
    async fn restart(&self, workspace_id: &str) -> Result<()>;

    /// Stops the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine failed to stop.
    async fn stop(&self, workspace_id: &str) -> Result<()>;
}

/// Runtime used without a GUI: reads drafts straight from tiddler files.
pub struct HeadlessRuntime {
    store: Arc<dyn WorkspaceStore>,
}

impl HeadlessRuntime {
    /// Creates a headless runtime resolving workspaces through `store`.
    #[must_use]
    pub fn new(store: Arc<dyn WorkspaceStore>) -> Self {
        Self { store }
    }

    /// Working trees the wiki's engine would load: its own and its sub-wikis'.
    fn content_roots(&self, workspace_id: &str) -> Result<Vec<PathBuf>> {
        let workspace = self
            .store
            .get(workspace_id)?
            .ok_or_else(|| WorkspaceError::NotFound(workspace_id.to_string()))?;

        let mut roots = vec![workspace.wiki_folder_location];
        roots.extend(
            self.store
                .sub_workspaces(workspace_id)?
                .into_iter()
                .map(|sub| sub.wiki_folder_location),
        );
        Ok(roots)
    }
}

#[async_trait]
impl WikiRuntime for HeadlessRuntime {
    async fn run_filter(&self, workspace_id: &str, filter: &str) -> Result<Vec<String>> {
        if filter.trim() != DRAFT_FILTER {
            return Err(WikiError::runtime(
                workspace_id,
                format!("unsupported filter '{filter}'"),
            ));
        }

        let roots = self.content_roots(workspace_id)?;
        let titles: Vec<String> = tokio::task::spawn_blocking(move || {
            roots.iter().flat_map(|root| scan_drafts(root)).collect()
        })
        .await?;
        Ok(titles)
    }

    async fn unsaved_edit_titles(&self, _workspace_id: &str) -> Result<Vec<String>> {
        // No rendered view, so nothing can be mid-edit.
        Ok(Vec::new())
    }

    async fn notify(&self, workspace_id: &str, message: &str) -> Result<()> {
        info!(workspace = %workspace_id, "{message}");
        Ok(())
    }

    async fn restart(&self, workspace_id: &str) -> Result<()> {
        info!(workspace = %workspace_id, "Restarting wiki");
        Ok(())
    }

    async fn stop(&self, workspace_id: &str) -> Result<()> {
        info!(workspace = %workspace_id, "Stopping wiki");
        Ok(())
    }
}

/// Titles of every `.tid` file under `root` carrying a `draft.of` field.
fn scan_drafts(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tid"))
        .filter_map(|e| {
            let content = std::fs::read_to_string(e.path()).ok()?;
            let fields = header_fields(&content);
            fields.iter().find(|(k, _)| *k == DRAFT_FIELD)?;
            let title = fields
                .iter()
                .find(|(k, _)| *k == "title")
                .map(|(_, v)| (*v).to_string())
                .or_else(|| {
                    e.path()
                        .file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                })?;
            debug!(path = %e.path().display(), %title, "Found draft");
            Some(title)
        })
        .collect()
}

/// `name: value` lines up to the first blank line.
fn header_fields(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect()
}
