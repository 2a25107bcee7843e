//! Credential command handlers.

use crate::auth::{CredentialStore, GitUserInfo, StorageService};
use crate::error::{Result, WikiError};

/// Handle the `wikisync login` command.
pub fn handle_login(service: StorageService, info: &GitUserInfo) -> Result<()> {
    if !service.is_remote() {
        println!("Local wikis need no credentials.");
        return Ok(());
    }
    if !info.is_usable() {
        return Err(WikiError::InvalidCredentials(service.to_string()));
    }

    CredentialStore::new().save(service, info)?;
    println!("Stored credentials for {} as {}.", service, info.username);
    Ok(())
}

/// Handle the `wikisync logout` command.
pub fn handle_logout(service: StorageService) -> Result<()> {
    if CredentialStore::new().delete(service)? {
        println!("Removed credentials for {service}.");
    } else {
        println!("No credentials stored for {service}.");
    }
    Ok(())
}
