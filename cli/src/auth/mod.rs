//! Git credentials for remote storage services.
//!
//! Credentials live in the OS keyring, one entry per storage service, and are
//! resolved through [`CredentialProvider`] each time the engine needs them.

pub mod credentials;
pub mod user_info;

pub use credentials::{CredentialProvider, CredentialStore};
pub use user_info::{GitUserInfo, StorageService};

#[cfg(test)]
pub use credentials::MockCredentialProvider;
