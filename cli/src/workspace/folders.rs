//! On-disk wiki folder operations.
//!
//! A sub-wiki's folder is linked into its main wiki at
//! `tiddlers/subwiki/<folder>`, and the main wiki routes tiddlers tagged with
//! the sub-wiki's tag there through `$__config_FileSystemPaths.tid`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::workspace::types::Workspace;

/// Folder under the main wiki's tiddlers that holds sub-wiki links.
const SUB_WIKI_DIR: &str = "subwiki";

/// Tiddler file holding the main wiki's routing filters.
const FILE_SYSTEM_PATHS_FILE: &str = "$__config_FileSystemPaths.tid";

/// Header of a freshly created routing tiddler.
const FILE_SYSTEM_PATHS_HEADER: &str = "title: $:/config/FileSystemPaths\n\n";

/// Filesystem changes made when workspaces come and go.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FolderOps: Send + Sync {
    /// Deletes a wiki's working tree. A missing folder is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder exists but could not be removed.
    async fn remove_wiki_folder(&self, path: &Path) -> Result<()>;

    /// Links `sub` into `main`'s content tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the link or routing entry could not be written.
    async fn attach_sub_wiki(&self, main: &Workspace, sub: &Workspace) -> Result<()>;

    /// Unlinks `sub` from `main`'s content tree. Missing links are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the link or routing entry could not be removed.
    async fn detach_sub_wiki(&self, main: &Workspace, sub: &Workspace) -> Result<()>;
}

/// [`FolderOps`] against the local filesystem.
#[derive(Debug, Default)]
pub struct LocalFolderOps;

impl LocalFolderOps {
    /// Creates local folder operations.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn link_path(main: &Workspace, sub: &Workspace) -> PathBuf {
        main.wiki_folder_location
            .join("tiddlers")
            .join(SUB_WIKI_DIR)
            .join(sub.folder_name())
    }

    fn routing_file(main: &Workspace) -> PathBuf {
        main.wiki_folder_location
            .join("tiddlers")
            .join(FILE_SYSTEM_PATHS_FILE)
    }
}

#[async_trait]
impl FolderOps for LocalFolderOps {
    async fn remove_wiki_folder(&self, path: &Path) -> Result<()> {
        if path.parent().is_none() {
            return Err(io::Error::other(format!(
                "refusing to remove filesystem root {}",
                path.display()
            ))
            .into());
        }

        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => {
                info!(path = %path.display(), "Removed wiki folder");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Wiki folder already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn attach_sub_wiki(&self, main: &Workspace, sub: &Workspace) -> Result<()> {
        let link = Self::link_path(main, sub);
        if let Some(parent) = link.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if tokio::fs::symlink_metadata(&link).await.is_err() {
            create_dir_link(&sub.wiki_folder_location, &link).await?;
            debug!(link = %link.display(), "Linked sub-wiki");
        }

        if let Some(tag) = sub.tag_name.as_deref().filter(|t| !t.trim().is_empty()) {
            let file = Self::routing_file(main);
            let current = read_or_empty(&file).await?;
            let updated = add_routing_line(&current, tag, &sub.folder_name());
            if updated != current {
                tokio::fs::write(&file, updated).await?;
            }
        }

        info!(main = %main.name, sub = %sub.name, "Attached sub-wiki");
        Ok(())
    }

    async fn detach_sub_wiki(&self, main: &Workspace, sub: &Workspace) -> Result<()> {
        let link = Self::link_path(main, sub);
        if tokio::fs::symlink_metadata(&link).await.is_ok() {
            remove_dir_link(&link).await?;
        }

        let file = Self::routing_file(main);
        let current = read_or_empty(&file).await?;
        if !current.is_empty() {
            let updated = remove_routing_line(&current, &sub.folder_name());
            if updated != current {
                tokio::fs::write(&file, updated).await?;
            }
        }

        info!(main = %main.name, sub = %sub.name, "Detached sub-wiki");
        Ok(())
    }
}

#[cfg(unix)]
async fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink(target, link).await
}

#[cfg(windows)]
async fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    tokio::fs::symlink_dir(target, link).await
}

#[cfg(unix)]
async fn remove_dir_link(link: &Path) -> io::Result<()> {
    tokio::fs::remove_file(link).await
}

#[cfg(windows)]
async fn remove_dir_link(link: &Path) -> io::Result<()> {
    tokio::fs::remove_dir(link).await
}

async fn read_or_empty(path: &Path) -> io::Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

fn routing_suffix(folder: &str) -> String {
    format!("addprefix[/{SUB_WIKI_DIR}/{folder}/]]")
}

/// Adds the filter routing `tag` into the sub-wiki folder, if not present.
fn add_routing_line(text: &str, tag: &str, folder: &str) -> String {
    let suffix = routing_suffix(folder);
    if text.lines().any(|line| line.trim_end().ends_with(&suffix)) {
        return text.to_string();
    }

    let mut out = if text.trim().is_empty() {
        FILE_SYSTEM_PATHS_HEADER.to_string()
    } else {
        text.to_string()
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("[tag[{tag}]{suffix}\n"));
    out
}

/// Drops every filter routing into the sub-wiki folder.
fn remove_routing_line(text: &str, folder: &str) -> String {
    let suffix = routing_suffix(folder);
    let mut out: String = text
        .lines()
        .filter(|line| !line.trim_end().ends_with(&suffix))
        .collect::<Vec<_>>()
        .join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}
