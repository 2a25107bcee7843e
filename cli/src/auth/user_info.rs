//! Storage services and the git identity used to reach them.

use serde::{Deserialize, Serialize};

/// Where a workspace's content is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageService {
    /// Local git repository only, never pushed anywhere.
    #[default]
    Local,
    GitHub,
    GitLab,
    Gitee,
}

impl StorageService {
    /// Returns true for every service backed by a remote repository.
    #[must_use]
    pub const fn is_remote(self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl std::fmt::Display for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::GitHub => write!(f, "github"),
            Self::GitLab => write!(f, "gitlab"),
            Self::Gitee => write!(f, "gitee"),
        }
    }
}

impl TryFrom<&str> for StorageService {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            "gitee" => Ok(Self::Gitee),
            _ => Err(format!("Unknown storage service: {s}")),
        }
    }
}

/// Git identity and access token for one storage service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitUserInfo {
    /// Login name on the service.
    pub username: String,
    /// Commit author email.
    pub email: String,
    /// Personal access token used as the HTTPS password.
    pub access_token: String,
    /// Branch to sync.
    pub branch: String,
}

// Keeps the token out of logs.
impl std::fmt::Debug for GitUserInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitUserInfo")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .field("branch", &self.branch)
            .finish()
    }
}

impl GitUserInfo {
    /// Returns false when the token or user name is blank.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.username.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}
