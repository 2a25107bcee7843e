//! One repeating sync timer per workspace.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::SharedPreferences;
use crate::sync::orchestrator::WikiSyncer;
use crate::workspace::{Workspace, WorkspaceStore};

/// Shortest period a timer may use.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the interval timers, keyed by workspace id.
pub struct IntervalScheduler {
    syncer: Arc<dyn WikiSyncer>,
    store: Arc<dyn WorkspaceStore>,
    preferences: SharedPreferences,
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl IntervalScheduler {
    /// Creates a scheduler with no timers.
    #[must_use]
    pub fn new(
        syncer: Arc<dyn WikiSyncer>,
        store: Arc<dyn WorkspaceStore>,
        preferences: SharedPreferences,
    ) -> Self {
        Self {
            syncer,
            store,
            preferences,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// (Re)installs the timer for `workspace`.
    ///
    /// Any existing timer for the id is cancelled first. No timer is installed
    /// unless the workspace syncs or backs up on an interval.
    pub async fn start(&self, workspace: &Workspace) {
        let mut timers = self.timers.lock().await;
        if let Some(old) = timers.remove(&workspace.id) {
            old.abort();
        }
        if !workspace.wants_interval() {
            debug!(workspace = %workspace.id, "Interval sync disabled");
            return;
        }

        let period = self
            .preferences
            .read()
            .await
            .sync_interval()
            .max(MIN_INTERVAL);
        let handle = tokio::spawn(run_timer(
            workspace.id.clone(),
            period,
            Arc::clone(&self.syncer),
            Arc::clone(&self.store),
        ));
        timers.insert(workspace.id.clone(), handle);
        info!(workspace = %workspace.id, period_secs = period.as_secs(), "Interval sync started");
    }

    /// Cancels the timer for `id`, if any.
    pub async fn stop(&self, id: &str) {
        if let Some(handle) = self.timers.lock().await.remove(id) {
            handle.abort();
            debug!(workspace = %id, "Interval sync stopped");
        }
    }

    /// Cancels every timer.
    pub async fn stop_all(&self) {
        let mut timers = self.timers.lock().await;
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    /// Replaces all timers, e.g. after the interval preference changed.
    pub async fn restart_all(&self, workspaces: &[Workspace]) {
        self.stop_all().await;
        for workspace in workspaces {
            self.start(workspace).await;
        }
    }

    /// Number of timers still running.
    pub async fn active_count(&self) -> usize {
        self.timers
            .lock()
            .await
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// True if a live timer exists for `id`.
    #[cfg(test)]
    pub async fn is_scheduled(&self, id: &str) -> bool {
        self.timers
            .lock()
            .await
            .get(id)
            .is_some_and(|handle| !handle.is_finished())
    }
}

async fn run_timer(
    id: String,
    period: Duration,
    syncer: Arc<dyn WikiSyncer>,
    store: Arc<dyn WorkspaceStore>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the first immediate tick

    loop {
        interval.tick().await;

        // Settings may have changed since the timer was installed.
        let workspace = match store.get(&id) {
            Ok(Some(workspace)) => workspace,
            Ok(None) => {
                info!(workspace = %id, "Workspace removed, stopping interval sync");
                break;
            }
            Err(e) => {
                warn!(workspace = %id, error = %e, "Could not load workspace for interval sync");
                continue;
            }
        };

        match syncer.sync_wiki_if_needed(&workspace).await {
            Ok(outcome) => debug!(workspace = %id, ?outcome, "Interval sync finished"),
            Err(e) if e.is_retriable() => {
                warn!(workspace = %id, error = %e, "Interval sync failed, retrying next tick");
            }
            Err(e) => error!(workspace = %id, error = %e, "Interval sync failed"),
        }
    }
}
