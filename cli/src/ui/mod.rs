//! User-facing prompts and notifications.
//!
//! - [`Dialog`] - Removal confirmation with three choices
//! - [`Notifier`] - One-shot desktop-style notifications

pub mod dialog;
pub mod notifier;

pub use dialog::{Dialog, RemovalChoice, TerminalDialog};
pub use notifier::{Notifier, TerminalNotifier};

#[cfg(test)]
pub use dialog::MockDialog;
#[cfg(test)]
pub use notifier::MockNotifier;
