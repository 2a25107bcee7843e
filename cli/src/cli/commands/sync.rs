//! Sync command handlers for wikisync.
//!
//! - [`handle_sync`] - One sync pass now (`wikisync sync`)
//! - [`handle_watch`] - Interval timers until ctrl-c or SIGTERM, then a final flush (`wikisync watch`)
//! - [`handle_flush`] - The shutdown flush on its own (`wikisync flush`)
//! - [`handle_commit_message`] - Preview a generated commit message (`wikisync commit-message`)

use std::sync::Arc;

use tracing::{error, info};

use crate::cli::commands::Engine;
use crate::error::Result;
use crate::sync::{FlushReport, IntervalScheduler, SkipReason, SyncOutcome, WikiSyncer};
use crate::workspace::Workspace;

/// Handles the `wikisync sync` command.
///
/// With no workspace given, syncs every wiki except remote sub-wikis, which
/// their main wiki syncs.
///
/// # Errors
///
/// Returns an error if the named workspace's own sync fails. When syncing
/// everything, failures are reported per wiki.
pub async fn handle_sync(engine: &Engine, key: Option<&str>) -> Result<()> {
    let orchestrator = engine.orchestrator()?;

    if let Some(key) = key {
        let workspace = engine.find_workspace(key)?;
        let outcome = orchestrator.sync_wiki_if_needed(&workspace).await?;
        println!("{}: {}", workspace.name, describe_outcome(outcome));
        return Ok(());
    }

    let workspaces = engine.store.list()?;
    let targets = sync_targets(&workspaces);
    if targets.is_empty() {
        println!("No wikis to sync.");
        return Ok(());
    }

    let mut failed = 0;
    for workspace in targets {
        match orchestrator.sync_wiki_if_needed(workspace).await {
            Ok(outcome) => println!("{}: {}", workspace.name, describe_outcome(outcome)),
            Err(e) => {
                failed += 1;
                error!(workspace = %workspace.id, error = %e, "Sync failed");
                println!("{}: failed ({e})", workspace.name);
            }
        }
    }
    if failed > 0 {
        println!("\n{failed} wiki(s) failed to sync.");
    }
    Ok(())
}

/// Wikis a full sync pass visits.
fn sync_targets(workspaces: &[Workspace]) -> Vec<&Workspace> {
    workspaces
        .iter()
        .filter(|ws| ws.is_wiki() && !(ws.is_sub_wiki && ws.is_remote()))
        .collect()
}

fn describe_outcome(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Skipped(SkipReason::NotAWiki) => "skipped, not a wiki",
        SyncOutcome::Skipped(SkipReason::InFlight) => "skipped, already syncing",
        SyncOutcome::Skipped(SkipReason::DraftsPending) => "skipped, drafts pending",
        SyncOutcome::Skipped(SkipReason::MissingCredentials) => {
            "skipped, no credentials or remote URL"
        }
        SyncOutcome::Committed { committed: true } => "backed up",
        SyncOutcome::Committed { committed: false } => "nothing to back up",
        SyncOutcome::Synced { changed: true } => "synced, remote changes pulled",
        SyncOutcome::Synced { changed: false } => "synced",
    }
}

/// Handles the `wikisync watch` command.
///
/// # Errors
///
/// Returns an error if the services cannot be built or the signal handler fails.
pub async fn handle_watch(engine: &Engine) -> Result<()> {
    let orchestrator: Arc<dyn WikiSyncer> = engine.orchestrator()?;
    let scheduler = IntervalScheduler::new(
        orchestrator,
        Arc::clone(&engine.store),
        Arc::clone(&engine.preferences),
    );
    let flush = engine.shutdown_flush()?;

    let workspaces = engine.store.list()?;
    let targets: Vec<Workspace> = sync_targets(&workspaces).into_iter().cloned().collect();
    scheduler.restart_all(&targets).await;
    let interval = engine.preferences.read().await.sync_interval();
    println!(
        "Watching {} wiki(s) every {}s. Press Ctrl-C to stop.",
        scheduler.active_count().await,
        interval.as_secs()
    );

    shutdown_signal().await?;
    info!("Interrupted, stopping interval sync");
    scheduler.stop_all().await;

    println!("Syncing before exit...");
    print_report(flush.flush().await);
    Ok(())
}

/// Resolves on ctrl-c, or on SIGTERM where the platform has it.
#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

/// Handles the `wikisync flush` command.
///
/// # Errors
///
/// Returns an error if the connectivity probe cannot be built.
pub async fn handle_flush(engine: &Engine) -> Result<()> {
    print_report(engine.shutdown_flush()?.flush().await);
    Ok(())
}

fn print_report(report: FlushReport) {
    if report.attempted == 0 {
        println!("Nothing pushed (offline or no remote wikis).");
    } else {
        println!(
            "Pushed {} of {} remote wiki(s).",
            report.succeeded, report.attempted
        );
    }
}

/// Handles the `wikisync commit-message` command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be found or the endpoint client
/// cannot be built.
pub async fn handle_commit_message(engine: &Engine, key: &str) -> Result<()> {
    let workspace = engine.find_workspace(key)?;
    let synthesizer = engine.synthesizer()?;

    match synthesizer.generate(&workspace.wiki_folder_location).await {
        Some(message) => println!("{message}"),
        None => {
            println!("No commit message generated.");
            println!(
                "Check that 'ai_generate_backup_title' is on, a provider and model are set, \
                 and the wiki has changes."
            );
        }
    }
    Ok(())
}
