//! Workspace data types for wikisync.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::StorageService;

/// What a workspace shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceKind {
    /// A wiki with a content tree on disk.
    #[default]
    Wiki,
    /// A web page or built-in view without content of its own.
    Page,
}

/// A tracked wiki workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique id (used as the record's file name).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Wiki or page.
    #[serde(default)]
    pub kind: WorkspaceKind,

    /// Where the content is synced to.
    #[serde(default)]
    pub storage_service: StorageService,

    /// Working tree path.
    pub wiki_folder_location: PathBuf,

    /// Remote repository URL.
    #[serde(default)]
    pub git_url: Option<String>,

    /// Whether this wiki lives inside a main wiki's tree.
    #[serde(default)]
    pub is_sub_wiki: bool,

    /// Main wiki id, set for sub-wikis.
    #[serde(default)]
    pub main_wiki_id: Option<String>,

    /// Tag routing tiddlers into this sub-wiki.
    #[serde(default)]
    pub tag_name: Option<String>,

    /// Runtime intentionally not loaded.
    #[serde(default)]
    pub hibernated: bool,

    /// Sync with the remote on the interval timer.
    #[serde(default)]
    pub sync_on_interval: bool,

    /// Commit locally on the interval timer.
    #[serde(default)]
    pub backup_on_interval: bool,

    /// The runtime reloads itself on file changes.
    #[serde(default)]
    pub enable_file_system_watch: bool,

    /// Currently selected workspace.
    #[serde(default)]
    pub active: bool,

    /// Stable ordering key.
    #[serde(default)]
    pub order: u32,

    /// When the workspace was created.
    pub created_at: DateTime<Utc>,

    /// When the workspace was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Creates a local main wiki with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, wiki_folder_location: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind: WorkspaceKind::Wiki,
            storage_service: StorageService::Local,
            wiki_folder_location,
            git_url: None,
            is_sub_wiki: false,
            main_wiki_id: None,
            tag_name: None,
            hibernated: false,
            sync_on_interval: false,
            backup_on_interval: false,
            enable_file_system_watch: false,
            active: false,
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only wikis have content to sync.
    #[must_use]
    pub fn is_wiki(&self) -> bool {
        self.kind == WorkspaceKind::Wiki
    }

    /// Backed by a remote storage service.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.storage_service.is_remote()
    }

    /// Whether the interval scheduler should keep a timer for this workspace.
    #[must_use]
    pub const fn wants_interval(&self) -> bool {
        self.sync_on_interval || self.backup_on_interval
    }

    /// Id whose content runtime tracks this workspace's drafts.
    ///
    /// Sub-wikis share their main wiki's runtime.
    #[must_use]
    pub fn runtime_id(&self) -> &str {
        match (&self.main_wiki_id, self.is_sub_wiki) {
            (Some(main), true) => main,
            _ => &self.id,
        }
    }

    /// Folder name of the working tree.
    #[must_use]
    pub fn folder_name(&self) -> String {
        self.wiki_folder_location
            .file_name()
            .map_or_else(|| self.id.clone(), |n| n.to_string_lossy().to_string())
    }

    /// Updates the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Settings for a workspace about to be created.
#[derive(Debug, Clone)]
pub struct NewWorkspace {
    /// Display name.
    pub name: String,
    /// Where the content is synced to.
    pub storage_service: StorageService,
    /// Working tree path.
    pub wiki_folder_location: PathBuf,
    /// Remote repository URL.
    pub git_url: Option<String>,
    /// Main wiki id for a sub-wiki.
    pub main_wiki_id: Option<String>,
    /// Tag routing tiddlers into a sub-wiki.
    pub tag_name: Option<String>,
    /// Sync with the remote on the interval timer.
    pub sync_on_interval: bool,
    /// Commit locally on the interval timer.
    pub backup_on_interval: bool,
    /// The runtime reloads itself on file changes.
    pub enable_file_system_watch: bool,
}

impl NewWorkspace {
    /// A local main wiki with interval backups on.
    #[must_use]
    pub fn new(name: impl Into<String>, wiki_folder_location: PathBuf) -> Self {
        Self {
            name: name.into(),
            storage_service: StorageService::Local,
            wiki_folder_location,
            git_url: None,
            main_wiki_id: None,
            tag_name: None,
            sync_on_interval: false,
            backup_on_interval: true,
            enable_file_system_watch: false,
        }
    }

    /// Builds the record, assigning `order`.
    #[must_use]
    pub fn into_workspace(self, order: u32) -> Workspace {
        let mut ws = Workspace::new(self.name, self.wiki_folder_location);
        ws.storage_service = self.storage_service;
        ws.git_url = self.git_url.filter(|u| !u.trim().is_empty());
        ws.is_sub_wiki = self.main_wiki_id.is_some();
        ws.main_wiki_id = self.main_wiki_id;
        ws.tag_name = self.tag_name;
        ws.sync_on_interval = self.sync_on_interval;
        ws.backup_on_interval = self.backup_on_interval;
        ws.enable_file_system_watch = self.enable_file_system_watch;
        ws.order = order;
        ws
    }
}
