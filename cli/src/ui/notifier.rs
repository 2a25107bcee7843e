//! Notifications.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

/// Shows a notification to the user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Shows `body` under `title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be delivered.
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Writes notifications to stderr and the log.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    /// Creates a terminal notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        info!(title, "{body}");
        eprintln!("[{title}] {body}");
        Ok(())
    }
}
