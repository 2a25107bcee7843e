//! Wikisync - git sync and backup engine for wiki workspaces
//!
//! Wikisync commits wiki folders on an interval, syncs them with their
//! remote repositories, cascades syncs to sub-wikis, and pushes everything
//! once more before exiting.

mod auth;
mod cli;
mod client;
mod config;
mod error;
mod git;
mod sync;
mod ui;
mod wiki;
mod workspace;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::auth::GitUserInfo;
use crate::cli::commands::{self, workspace::AddOptions, Engine};
use crate::cli::{Cli, Commands};
use crate::config::settings::env;
use crate::error::{Result, WikiError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(env::LOG_LEVEL)
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    // Run the command
    if let Err(e) = run(cli).await {
        match &e {
            WikiError::Workspace(ws_err) => {
                eprintln!("{}: {e}", ws_err.category());
                if ws_err.is_revert_failure() {
                    eprintln!("Some files created for the wiki may remain and need removing by hand.");
                }
            }
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login {
            service,
            username,
            email,
            token,
            branch,
        } => {
            let info = GitUserInfo {
                username,
                email,
                access_token: token,
                branch,
            };
            commands::handle_login(service.into(), &info)
        }
        Commands::Logout { service } => commands::handle_logout(service.into()),
        Commands::Completions { shell } => commands::handle_completions(shell),
        Commands::Add {
            name,
            path,
            service,
            git_url,
            main,
            tag,
            sync_on_interval,
            no_backup,
            watch_files,
        } => {
            let options = AddOptions {
                name,
                path,
                service: service.into(),
                git_url,
                main,
                tag,
                sync_on_interval,
                backup_on_interval: !no_backup,
                enable_file_system_watch: watch_files,
            };
            commands::handle_add(&Engine::load()?, options).await
        }
        Commands::Remove { workspace } => {
            commands::handle_remove(&Engine::load()?, &workspace).await
        }
        Commands::List => commands::handle_list(&Engine::load()?),
        Commands::Sync { workspace } => {
            commands::handle_sync(&Engine::load()?, workspace.as_deref()).await
        }
        Commands::Watch => commands::handle_watch(&Engine::load()?).await,
        Commands::Flush => commands::handle_flush(&Engine::load()?).await,
        Commands::CommitMessage { workspace } => {
            commands::handle_commit_message(&Engine::load()?, &workspace).await
        }
    }
}
