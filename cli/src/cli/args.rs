//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::auth::StorageService;

/// Git sync and backup engine for wiki workspaces.
///
/// Wikisync keeps wiki folders committed locally and synced with their
/// remote repositories on an interval, cascading to sub-wikis.
#[derive(Parser, Debug)]
#[command(name = "wikisync")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a wiki workspace and initialize its git repository.
    ///
    /// If initialization fails, the workspace and anything created for it
    /// are removed again.
    Add {
        /// Display name of the wiki.
        name: String,

        /// Folder holding the wiki content.
        path: PathBuf,

        /// Storage service the wiki syncs with.
        #[arg(short, long, value_enum, default_value = "local")]
        service: ServiceArg,

        /// Remote repository URL (required for remote services).
        #[arg(long)]
        git_url: Option<String>,

        /// Make this a sub-wiki of the given main wiki (id or name).
        #[arg(long)]
        main: Option<String>,

        /// Tag whose tiddlers are routed into the sub-wiki.
        #[arg(long, requires = "main")]
        tag: Option<String>,

        /// Sync with the remote on the interval timer.
        #[arg(long)]
        sync_on_interval: bool,

        /// Do not commit locally on the interval timer.
        #[arg(long)]
        no_backup: bool,

        /// The wiki reloads itself on file changes.
        #[arg(long)]
        watch_files: bool,
    },

    /// Remove a wiki workspace.
    ///
    /// Asks whether to keep or delete the wiki folder.
    Remove {
        /// Workspace id or name.
        workspace: String,
    },

    /// List all wiki workspaces.
    List,

    /// Commit and sync wikis now.
    Sync {
        /// Workspace id or name (all wikis if omitted).
        workspace: Option<String>,
    },

    /// Sync wikis on their interval until interrupted.
    ///
    /// On ctrl-c, pushes every remote wiki once more before exiting.
    Watch,

    /// Push every remote wiki once, as on shutdown.
    Flush,

    /// Print the commit message that would be generated for a wiki.
    CommitMessage {
        /// Workspace id or name.
        workspace: String,
    },

    /// Store git credentials for a storage service.
    Login {
        /// Storage service to log in to.
        #[arg(value_enum)]
        service: ServiceArg,

        /// Git user name.
        #[arg(short, long)]
        username: String,

        /// Commit email.
        #[arg(short, long)]
        email: String,

        /// Personal access token.
        #[arg(long, env = "WIKISYNC_GIT_TOKEN", hide_env_values = true)]
        token: String,

        /// Branch to sync.
        #[arg(short, long, default_value = "main")]
        branch: String,
    },

    /// Remove stored credentials for a storage service.
    Logout {
        /// Storage service to log out of.
        #[arg(value_enum)]
        service: ServiceArg,
    },

    /// Generate shell completion scripts.
    ///
    /// Outputs completion script for the specified shell.
    /// Follow shell-specific instructions to install.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: ShellType,
    },
}

/// Supported shell types for completions.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
}

/// Storage service argument for CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServiceArg {
    Local,
    #[value(name = "github")]
    GitHub,
    #[value(name = "gitlab")]
    GitLab,
    Gitee,
}

impl From<ServiceArg> for StorageService {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Local => Self::Local,
            ServiceArg::GitHub => Self::GitHub,
            ServiceArg::GitLab => Self::GitLab,
            ServiceArg::Gitee => Self::Gitee,
        }
    }
}
