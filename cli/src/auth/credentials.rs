//! Secure credential storage using the operating system keyring.
//!
//! This module provides platform-specific secure storage for git credentials:
//! - macOS: Keychain
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - Windows: Credential Manager
//!
//! One [`GitUserInfo`] is stored as JSON per storage service.

use keyring::Entry;

use crate::auth::user_info::{GitUserInfo, StorageService};
use crate::error::{Result, WikiError};

const SERVICE_NAME: &str = "dev.wikisync.cli";

/// Resolves the git identity for a storage service on demand.
///
/// Implementations must not cache beyond a single call; the engine asks
/// again on every orchestration.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialProvider: Send + Sync {
    /// Returns the stored identity for `service`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreadable.
    fn user_info(&self, service: StorageService) -> Result<Option<GitUserInfo>>;
}

/// Credential storage backed by the OS keyring.
pub struct CredentialStore;

impl CredentialStore {
    /// Creates a new credential store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn entry(service: StorageService) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &format!("git-user-info:{service}"))
            .map_err(|e| WikiError::CredentialStorage(e.to_string()))
    }

    /// Saves credentials for a service, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the keyring is inaccessible.
    pub fn save(&self, service: StorageService, info: &GitUserInfo) -> Result<()> {
        let json = serde_json::to_string(info)?;
        Self::entry(service)?
            .set_password(&json)
            .map_err(|e| WikiError::CredentialStorage(e.to_string()))?;
        Ok(())
    }

    /// Loads credentials for a service.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::InvalidCredentials`] if stored data cannot be parsed,
    /// or [`WikiError::CredentialStorage`] if the keyring is inaccessible.
    pub fn load(&self, service: StorageService) -> Result<Option<GitUserInfo>> {
        match Self::entry(service)?.get_password() {
            Ok(json) => {
                let info: GitUserInfo = serde_json::from_str(&json)
                    .map_err(|_| WikiError::InvalidCredentials(service.to_string()))?;
                Ok(Some(info))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(WikiError::CredentialStorage(e.to_string())),
        }
    }

    /// Deletes stored credentials for a service.
    ///
    /// Returns `true` if something was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`WikiError::CredentialStorage`] if the keyring is inaccessible.
    pub fn delete(&self, service: StorageService) -> Result<bool> {
        match Self::entry(service)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(WikiError::CredentialStorage(e.to_string())),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for CredentialStore {
    fn user_info(&self, service: StorageService) -> Result<Option<GitUserInfo>> {
        if !service.is_remote() {
            return Ok(None);
        }
        Ok(self.load(service)?.filter(GitUserInfo::is_usable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_service_never_touches_keyring() {
        let store = CredentialStore::new();
        assert!(store.user_info(StorageService::Local).unwrap().is_none());
    }
}
