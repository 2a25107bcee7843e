//! Wiki workspaces: records, on-disk folders, and the create/remove lifecycle.

pub mod error;
pub mod folders;
pub mod storage;
pub mod transaction;
pub mod types;

pub use error::WorkspaceError;
#[cfg(test)]
pub use folders::MockFolderOps;
pub use folders::{FolderOps, LocalFolderOps};
pub use storage::{FileWorkspaceStore, WorkspaceStore};
pub use transaction::WorkspaceManager;
pub use types::{NewWorkspace, Workspace, WorkspaceKind};
