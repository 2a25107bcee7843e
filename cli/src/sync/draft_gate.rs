//! Draft gate: holds back a sync while the wiki has unsaved work.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::wiki::{WikiRuntime, DRAFT_FILTER};

/// Outcome of a draft check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No drafts; the sync may go ahead.
    Proceed,
    /// Drafts exist, or the check failed and the gate fails closed.
    Blocked {
        /// Titles found by either query.
        drafts: Vec<String>,
    },
}

impl GateDecision {
    /// True if the sync must not touch git.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Queries both the server-side and the view-side draft lists.
pub struct DraftGate {
    runtime: Arc<dyn WikiRuntime>,
}

impl DraftGate {
    /// Creates a gate over `runtime`.
    #[must_use]
    pub fn new(runtime: Arc<dyn WikiRuntime>) -> Self {
        Self { runtime }
    }

    /// Checks the wiki served under `workspace_id`.
    ///
    /// A failing query counts as empty when `fail_open` is set and blocks otherwise.
    pub async fn check(&self, workspace_id: &str, fail_open: bool) -> GateDecision {
        let (server, view) = tokio::join!(
            self.runtime.run_filter(workspace_id, DRAFT_FILTER),
            self.runtime.unsaved_edit_titles(workspace_id),
        );

        let mut drafts = Vec::new();
        let mut failed = false;
        for (source, result) in [("server", server), ("view", view)] {
            match collect(result) {
                Ok(titles) => drafts.extend(titles),
                Err(e) => {
                    warn!(workspace = %workspace_id, source, error = %e, "Draft check failed");
                    failed = true;
                }
            }
        }
        drafts.sort();
        drafts.dedup();

        if !drafts.is_empty() || (failed && !fail_open) {
            debug!(workspace = %workspace_id, count = drafts.len(), "Sync held back by drafts");
            GateDecision::Blocked { drafts }
        } else {
            GateDecision::Proceed
        }
    }
}

fn collect(result: Result<Vec<String>>) -> Result<Vec<String>> {
    result.map(|titles| {
        titles
            .into_iter()
            .filter(|title| !title.trim().is_empty())
            .collect()
    })
}
