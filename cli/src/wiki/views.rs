//! Rendered views of workspaces.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

/// Owns the rendered view of each workspace.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ViewManager: Send + Sync {
    /// Reloads the view after its content changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the view could not be reloaded.
    async fn reload(&self, workspace_id: &str) -> Result<()>;

    /// Destroys the view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view could not be removed.
    async fn remove(&self, workspace_id: &str) -> Result<()>;
}

/// No views to manage; records what would have happened.
#[derive(Debug, Default)]
pub struct HeadlessViews;

impl HeadlessViews {
    /// Creates the headless view manager.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ViewManager for HeadlessViews {
    async fn reload(&self, workspace_id: &str) -> Result<()> {
        info!(workspace = %workspace_id, "Reloading view");
        Ok(())
    }

    async fn remove(&self, workspace_id: &str) -> Result<()> {
        info!(workspace = %workspace_id, "Removing view");
        Ok(())
    }
}
