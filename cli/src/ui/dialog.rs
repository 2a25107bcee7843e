//! Removal confirmation.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use crate::error::{Result, WikiError};
use crate::workspace::Workspace;

/// What the user chose when asked to remove a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalChoice {
    /// Forget the workspace but keep its files.
    RemoveReference,
    /// Forget the workspace and delete its files.
    RemoveAndDeleteFiles,
    /// Do nothing.
    #[default]
    Cancel,
}

impl RemovalChoice {
    /// Parses a prompt answer. Anything unrecognized cancels.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "1" | "r" | "remove" => Self::RemoveReference,
            "2" | "d" | "delete" => Self::RemoveAndDeleteFiles,
            _ => Self::Cancel,
        }
    }
}

/// Asks the user to confirm destructive actions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Asks how to remove `workspace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt could not be shown or answered.
    async fn confirm_removal(&self, workspace: &Workspace) -> Result<RemovalChoice>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalDialog;

impl TerminalDialog {
    /// Creates a terminal dialog.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dialog for TerminalDialog {
    async fn confirm_removal(&self, workspace: &Workspace) -> Result<RemovalChoice> {
        let name = workspace.name.clone();
        let path = workspace.wiki_folder_location.display().to_string();

        tokio::task::spawn_blocking(move || {
            let mut stdout = io::stdout();
            println!("Remove workspace '{name}' ({path})?");
            println!("  1) Remove workspace, keep files");
            println!("  2) Remove workspace and delete files");
            println!("  3) Cancel (default)");
            print!("Choice [3]: ");
            stdout
                .flush()
                .map_err(|e| WikiError::Dialog(e.to_string()))?;

            let mut input = String::new();
            io::stdin()
                .lock()
                .read_line(&mut input)
                .map_err(|e| WikiError::Dialog(e.to_string()))?;
            Ok(RemovalChoice::parse(&input))
        })
        .await?
    }
}
