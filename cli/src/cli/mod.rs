//! CLI module for wikisync.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
