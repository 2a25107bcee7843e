//! Sync engine for wikisync.
//!
//! - [`SyncOrchestrator`] - Decides between local backup and remote sync, cascades to sub-wikis
//! - [`DraftGate`] - Holds back syncs while drafts are open
//! - [`CommitMessageSynthesizer`] - Generated commit messages, raced against a timeout
//! - [`IntervalScheduler`] - One repeating timer per workspace
//! - [`ShutdownFlush`] - Last concurrent push before exit

pub mod commit_message;
pub mod draft_gate;
pub mod orchestrator;
pub mod scheduler;
pub mod shutdown;

pub use commit_message::CommitMessageSynthesizer;
pub use draft_gate::DraftGate;
pub use orchestrator::{SkipReason, SyncOrchestrator, SyncOutcome, WikiSyncer};
pub use scheduler::IntervalScheduler;
pub use shutdown::{FlushReport, ShutdownFlush};
