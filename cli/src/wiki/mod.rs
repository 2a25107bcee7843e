//! Seams to the content engine and its rendered views.
//!
//! - [`WikiRuntime`] - Draft queries, advisory messages, restart and stop
//! - [`ViewManager`] - Reload and removal of rendered views
//!
//! [`HeadlessRuntime`] and [`HeadlessViews`] back these when no GUI is attached.

pub mod runtime;
pub mod views;

pub use runtime::{HeadlessRuntime, WikiRuntime, DRAFT_FILTER};
pub use views::{HeadlessViews, ViewManager};

#[cfg(test)]
pub use runtime::MockWikiRuntime;
#[cfg(test)]
pub use views::MockViewManager;
