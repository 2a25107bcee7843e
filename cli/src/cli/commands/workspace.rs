//! Workspace command handlers for wikisync.
//!
//! - [`handle_add`] - Create a wiki and initialize git (`wikisync add`)
//! - [`handle_remove`] - Remove a wiki, optionally deleting its folder (`wikisync remove`)
//! - [`handle_list`] - List wikis (`wikisync list`)
//! - [`handle_completions`] - Shell completions (`wikisync completions`)

use std::path::PathBuf;

use crate::auth::StorageService;
use crate::cli::args::ShellType;
use crate::cli::commands::Engine;
use crate::error::Result;
use crate::ui::RemovalChoice;
use crate::workspace::{NewWorkspace, Workspace};

/// Options for `wikisync add`.
#[derive(Debug)]
pub struct AddOptions {
    pub name: String,
    pub path: PathBuf,
    pub service: StorageService,
    pub git_url: Option<String>,
    pub main: Option<String>,
    pub tag: Option<String>,
    pub sync_on_interval: bool,
    pub backup_on_interval: bool,
    pub enable_file_system_watch: bool,
}

/// Handles the `wikisync add` command.
///
/// # Errors
///
/// Returns an error if the main wiki cannot be found or git initialization
/// fails. A failed initialization has already been rolled back.
pub async fn handle_add(engine: &Engine, options: AddOptions) -> Result<()> {
    let main_wiki_id = match options.main.as_deref() {
        Some(key) => Some(engine.find_workspace(key)?.id),
        None => None,
    };
    let credentials = engine.credentials.user_info(options.service)?;

    let config = NewWorkspace {
        storage_service: options.service,
        git_url: options.git_url,
        main_wiki_id,
        tag_name: options.tag,
        sync_on_interval: options.sync_on_interval,
        backup_on_interval: options.backup_on_interval,
        enable_file_system_watch: options.enable_file_system_watch,
        ..NewWorkspace::new(options.name, options.path)
    };

    let workspace = engine
        .manager()
        .init_wiki_git_transaction(config, credentials)
        .await?;

    println!("Created wiki '{}' ({})", workspace.name, workspace.id);
    println!("  Folder:  {}", workspace.wiki_folder_location.display());
    println!("  Storage: {}", workspace.storage_service);
    if workspace.is_sub_wiki {
        if let Some(tag) = &workspace.tag_name {
            println!("  Tag:     {tag}");
        }
    }
    Ok(())
}

/// Handles the `wikisync remove` command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be found.
pub async fn handle_remove(engine: &Engine, key: &str) -> Result<()> {
    let workspace = engine.find_workspace(key)?;

    match engine.manager().remove_workspace(&workspace.id).await {
        RemovalChoice::Cancel => println!("Cancelled."),
        RemovalChoice::RemoveReference => println!(
            "Removed '{}'. Files kept in {}",
            workspace.name,
            workspace.wiki_folder_location.display()
        ),
        RemovalChoice::RemoveAndDeleteFiles => {
            println!("Removed '{}' and deleted its folder.", workspace.name);
        }
    }
    Ok(())
}

/// Handles the `wikisync list` command.
///
/// # Errors
///
/// Returns an error if workspace storage cannot be accessed.
pub fn handle_list(engine: &Engine) -> Result<()> {
    let workspaces = engine.store.list()?;

    if workspaces.is_empty() {
        println!("No wikis added yet.");
        println!("\nAdd one with: wikisync add <name> <path>");
        return Ok(());
    }

    println!("Wikis:\n");
    for ws in &workspaces {
        println!("{}", describe(ws, &workspaces));
    }
    Ok(())
}

fn describe(ws: &Workspace, all: &[Workspace]) -> String {
    let marker = if ws.active { "*" } else { " " };
    let mut lines = vec![format!("{marker} {} ({})", ws.name, ws.id)];
    lines.push(format!("    Folder:  {}", ws.wiki_folder_location.display()));

    let storage = match &ws.git_url {
        Some(url) => format!("{} {url}", ws.storage_service),
        None => ws.storage_service.to_string(),
    };
    lines.push(format!("    Storage: {storage}"));

    if let Some(main_id) = ws.main_wiki_id.as_deref().filter(|_| ws.is_sub_wiki) {
        let main_name = all
            .iter()
            .find(|candidate| candidate.id == main_id)
            .map_or("<missing>", |main| main.name.as_str());
        let tag = ws.tag_name.as_deref().unwrap_or("-");
        lines.push(format!("    Sub-wiki of {main_name}, tag {tag}"));
    }

    let mut flags = Vec::new();
    if ws.sync_on_interval {
        flags.push("sync");
    }
    if ws.backup_on_interval {
        flags.push("backup");
    }
    if ws.hibernated {
        flags.push("hibernated");
    }
    if !flags.is_empty() {
        lines.push(format!("    Interval: {}", flags.join(", ")));
    }
    lines.push(format!("    Updated: {}", ws.updated_at.format("%Y-%m-%d %H:%M:%S")));
    lines.join("\n") + "\n"
}

/// Generates shell completion scripts.
pub fn handle_completions(shell: ShellType) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell};

    let mut cmd = crate::cli::Cli::command();
    let shell = match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
    };

    generate(shell, &mut cmd, "wikisync", &mut std::io::stdout());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_marks_active_and_sub_wikis() {
        let mut main = Workspace::new("notes", PathBuf::from("/wikis/notes"));
        main.active = true;
        main.backup_on_interval = true;
        let mut sub = Workspace::new("journal", PathBuf::from("/wikis/journal"));
        sub.is_sub_wiki = true;
        sub.main_wiki_id = Some(main.id.clone());
        sub.tag_name = Some("Journal".to_string());
        let all = vec![main.clone(), sub.clone()];

        let main_text = describe(&main, &all);
        assert!(main_text.starts_with("* notes"));
        assert!(main_text.contains("Interval: backup"));

        let sub_text = describe(&sub, &all);
        assert!(sub_text.starts_with("  journal"));
        assert!(sub_text.contains("Sub-wiki of notes, tag Journal"));
    }

    #[test]
    fn describe_flags_orphaned_sub_wiki() {
        let mut sub = Workspace::new("journal", PathBuf::from("/wikis/journal"));
        sub.is_sub_wiki = true;
        sub.main_wiki_id = Some("gone".to_string());

        assert!(describe(&sub, &[]).contains("Sub-wiki of <missing>"));
    }
}
