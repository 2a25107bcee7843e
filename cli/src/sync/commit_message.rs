//! Commit message synthesis from pending changes.
//!
//! The diff is shrunk before it reaches the text generator:
//! - Large chunks for embedded plugin files are replaced by a one-line placeholder
//! - With no patch at all, a short manifest of untracked files stands in
//! - The result is cut to a hard character limit
//!
//! Generation races a timeout. Every failure yields `None`, never an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::client::TextGenerator;
use crate::config::{AiConfig, SharedPreferences};
use crate::git::{DiffSnapshot, GitOperations};

/// Hard cap on diff characters sent to the generator.
pub const MAX_DIFF_CHARS: usize = 3000;

/// Appended after a cut diff.
pub const TRUNCATION_MARKER: &str = "\n... (diff truncated)";

/// Plugin chunks at or above this many characters are replaced.
const PLUGIN_CHUNK_LIMIT: usize = 1000;

/// Untracked files listed when there is no patch.
const MAX_UNTRACKED_FILES: usize = 5;

/// Characters shown per untracked file.
const MAX_UNTRACKED_CHARS: usize = 500;

/// Embedded plugin tiddler files, e.g. `$__plugins_tiddlywiki_markdown.json`.
static PLUGIN_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|/)\$__plugins_([^/]+?)(?:\.[A-Za-z0-9]+)*$").expect("valid plugin regex")
});

const INSTRUCTION: &str = "Write a git commit message for the following wiki changes. \
Answer with a single short line in the imperative mood, without quotes or explanations.\n\n";

/// Builds commit messages for automatic syncs.
pub struct CommitMessageSynthesizer {
    git: Arc<dyn GitOperations>,
    generator: Arc<dyn TextGenerator>,
    preferences: SharedPreferences,
    ai: AiConfig,
}

impl CommitMessageSynthesizer {
    /// Creates a synthesizer.
    #[must_use]
    pub fn new(
        git: Arc<dyn GitOperations>,
        generator: Arc<dyn TextGenerator>,
        preferences: SharedPreferences,
        ai: AiConfig,
    ) -> Self {
        Self {
            git,
            generator,
            preferences,
            ai,
        }
    }

    /// Describes the pending changes under `path`, or `None`.
    pub async fn generate(&self, path: &Path) -> Option<String> {
        let prefs = self.preferences.read().await.clone();
        if !prefs.ai_generate_backup_title {
            return None;
        }
        let Some(selection) = self.ai.default_model() else {
            debug!("No default model configured, skipping commit message generation");
            return None;
        };

        let snapshot = match self.git.diff_snapshot(path).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read diff for commit message");
                return None;
            }
        };

        let diff = describe_changes(path, &snapshot).await?;
        let prompt = format!("{INSTRUCTION}{}", truncate_diff(&diff));

        // The task is detached, not aborted, when the timeout wins.
        let generator = Arc::clone(&self.generator);
        let model = selection.model;
        let task = tokio::spawn(async move { generator.generate(&prompt, &model).await });

        match tokio::time::timeout(prefs.backup_title_timeout(), task).await {
            Ok(Ok(Ok(text))) => clean_message(&text),
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Commit message generation failed");
                None
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Commit message task failed");
                None
            }
            Err(_) => {
                info!(
                    timeout_ms = prefs.ai_generate_backup_title_timeout_ms,
                    "Commit message generation timed out"
                );
                None
            }
        }
    }
}

/// Patch text with plugin noise filtered, or an untracked-file manifest.
async fn describe_changes(root: &Path, snapshot: &DiffSnapshot) -> Option<String> {
    let patch = snapshot.combined_patch();
    if !patch.trim().is_empty() {
        return Some(filter_plugin_chunks(&patch));
    }
    if snapshot.untracked.is_empty() {
        return None;
    }

    let root = root.to_path_buf();
    let untracked = snapshot.untracked.clone();
    tokio::task::spawn_blocking(move || untracked_manifest(&root, &untracked))
        .await
        .ok()
}

/// Replaces large plugin chunks with a placeholder naming the plugin.
pub fn filter_plugin_chunks(patch: &str) -> String {
    split_chunks(patch)
        .into_iter()
        .map(|chunk| match plugin_name(chunk) {
            Some(name) if chunk.chars().count() >= PLUGIN_CHUNK_LIMIT => {
                format!("[plugin {name} changed, diff omitted]\n")
            }
            _ => chunk.to_string(),
        })
        .collect()
}

/// Splits a patch at each `diff --git` header.
fn split_chunks(patch: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = patch
        .match_indices("diff --git ")
        .filter(|(i, _)| *i == 0 || patch.as_bytes()[i - 1] == b'\n')
        .map(|(i, _)| i)
        .collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(patch.len());
            &patch[start..end]
        })
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Plugin name if the chunk's header names an embedded plugin file.
fn plugin_name(chunk: &str) -> Option<String> {
    let header = chunk.lines().next()?.strip_prefix("diff --git ")?;
    let path = header
        .rsplit_once(" b/")
        .map_or(header, |(_, b_path)| b_path)
        .trim_matches('"');
    PLUGIN_FILE
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Lists up to five untracked files with a prefix of each.
fn untracked_manifest(root: &Path, untracked: &[PathBuf]) -> String {
    let mut out = String::from("New files:\n");
    for relative in untracked.iter().take(MAX_UNTRACKED_FILES) {
        let content = std::fs::read_to_string(root.join(relative))
            .map(|text| text.chars().take(MAX_UNTRACKED_CHARS).collect::<String>())
            .unwrap_or_else(|_| "(binary or unreadable)".to_string());
        out.push_str(&format!("--- {}\n{}\n", relative.display(), content.trim_end()));
    }
    let remaining = untracked.len().saturating_sub(MAX_UNTRACKED_FILES);
    if remaining > 0 {
        out.push_str(&format!("... and {remaining} more files\n"));
    }
    out
}

/// Cuts `diff` to [`MAX_DIFF_CHARS`] characters and marks the cut.
pub fn truncate_diff(diff: &str) -> String {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &diff[..cut]),
        None => diff.to_string(),
    }
}

/// Trimmed single message, or `None` when nothing usable came back.
fn clean_message(text: &str) -> Option<String> {
    let message = text
        .trim()
        .trim_matches(|c| c == '"' || c == '`' || c == '\'')
        .trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTextGenerator;
    use crate::config::Preferences;
    use crate::error::Result;
    use crate::git::MockGitOperations;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::RwLock;

    fn chunk(path: &str, body_len: usize) -> String {
        format!(
            "diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n@@ -1 +1 @@\n+{}\n",
            "x".repeat(body_len)
        )
    }

    fn ai() -> AiConfig {
        AiConfig {
            provider: Some("openai".to_string()),
            model: Some("test-model".to_string()),
            ..AiConfig::default()
        }
    }

    fn prefs(enabled: bool) -> SharedPreferences {
        Arc::new(RwLock::new(Preferences {
            ai_generate_backup_title: enabled,
            ..Preferences::default()
        }))
    }

    fn git_with_patch(patch: &str) -> MockGitOperations {
        let mut git = MockGitOperations::new();
        let snapshot = DiffSnapshot {
            unstaged: patch.to_string(),
            ..DiffSnapshot::default()
        };
        git.expect_diff_snapshot()
            .returning(move |_| Ok(snapshot.clone()));
        git
    }

    /// A generator that never answers.
    struct PendingGenerator;

    #[async_trait]
    impl TextGenerator for PendingGenerator {
        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String> {
            std::future::pending().await
        }
    }

    #[test]
    fn large_plugin_chunk_is_replaced() {
        let plugin = chunk("tiddlers/$__plugins_tiddlywiki_markdown.json", 2000);
        let note = chunk("tiddlers/Journal.tid", 10);
        let filtered = filter_plugin_chunks(&format!("{plugin}{note}"));

        assert!(filtered.starts_with("[plugin tiddlywiki_markdown changed, diff omitted]\n"));
        assert!(filtered.ends_with(&note));
        assert!(!filtered.contains(&"x".repeat(2000)));
    }

    #[test]
    fn small_plugin_chunk_is_kept() {
        let plugin = chunk("tiddlers/$__plugins_foo.tid", 50);
        assert_eq!(filter_plugin_chunks(&plugin), plugin);
    }

    #[test]
    fn plugin_name_strips_extensions() {
        let c = chunk("tiddlers/$__plugins_tiddlywiki_codemirror.json.meta", 1);
        assert_eq!(plugin_name(&c).as_deref(), Some("tiddlywiki_codemirror"));
        assert!(plugin_name(&chunk("tiddlers/Notes.tid", 1)).is_none());
    }

    #[test]
    fn long_diff_is_cut_to_limit_plus_marker() {
        let diff = "a".repeat(5000);
        let cut = truncate_diff(&diff);

        assert_eq!(cut.len(), MAX_DIFF_CHARS + TRUNCATION_MARKER.len());
        assert!(cut.ends_with(TRUNCATION_MARKER));
        assert_eq!(truncate_diff("short"), "short");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let diff = "é".repeat(4000);
        let cut = truncate_diff(&diff);
        assert_eq!(
            cut.trim_end_matches(TRUNCATION_MARKER).chars().count(),
            MAX_DIFF_CHARS
        );
    }

    #[test]
    fn manifest_lists_five_files_and_counts_the_rest() {
        let dir = tempfile::TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..7)
            .map(|i| {
                let name = PathBuf::from(format!("t{i}.tid"));
                std::fs::write(dir.path().join(&name), "y".repeat(800)).unwrap();
                name
            })
            .collect();

        let manifest = untracked_manifest(dir.path(), &files);

        assert_eq!(manifest.matches("--- t").count(), 5);
        assert!(manifest.contains("... and 2 more files"));
        assert!(!manifest.contains(&"y".repeat(501)));
    }

    #[test]
    fn clean_message_trims_quotes() {
        assert_eq!(clean_message("  \"Add entry\"\n").as_deref(), Some("Add entry"));
        assert!(clean_message(" `` ").is_none());
    }

    #[tokio::test]
    async fn disabled_preference_yields_nothing() {
        let synthesizer = CommitMessageSynthesizer::new(
            Arc::new(MockGitOperations::new()),
            Arc::new(MockTextGenerator::new()),
            prefs(false),
            ai(),
        );
        assert!(synthesizer.generate(Path::new("/wiki")).await.is_none());
    }

    #[tokio::test]
    async fn missing_model_yields_nothing() {
        let synthesizer = CommitMessageSynthesizer::new(
            Arc::new(MockGitOperations::new()),
            Arc::new(MockTextGenerator::new()),
            prefs(true),
            AiConfig::default(),
        );
        assert!(synthesizer.generate(Path::new("/wiki")).await.is_none());
    }

    #[tokio::test]
    async fn empty_diff_yields_nothing() {
        let synthesizer = CommitMessageSynthesizer::new(
            Arc::new(git_with_patch("")),
            Arc::new(MockTextGenerator::new()),
            prefs(true),
            ai(),
        );
        assert!(synthesizer.generate(Path::new("/wiki")).await.is_none());
    }

    #[tokio::test]
    async fn generated_message_is_trimmed() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .withf(|prompt, model| prompt.contains("Journal.tid") && model == "test-model")
            .returning(|_, _| Ok("  Update journal  \n".to_string()));

        let synthesizer = CommitMessageSynthesizer::new(
            Arc::new(git_with_patch(&chunk("tiddlers/Journal.tid", 10))),
            Arc::new(generator),
            prefs(true),
            ai(),
        );

        assert_eq!(
            synthesizer.generate(Path::new("/wiki")).await.as_deref(),
            Some("Update journal")
        );
    }

    #[tokio::test]
    async fn generator_error_yields_nothing() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(crate::error::WikiError::Timeout));

        let synthesizer = CommitMessageSynthesizer::new(
            Arc::new(git_with_patch(&chunk("tiddlers/Journal.tid", 10))),
            Arc::new(generator),
            prefs(true),
            ai(),
        );

        assert!(synthesizer.generate(Path::new("/wiki")).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn never_settling_generation_times_out() {
        let synthesizer = CommitMessageSynthesizer::new(
            Arc::new(git_with_patch(&chunk("tiddlers/Journal.tid", 10))),
            Arc::new(PendingGenerator),
            prefs(true),
            ai(),
        );

        let started = tokio::time::Instant::now();
        assert!(synthesizer.generate(Path::new("/wiki")).await.is_none());
        assert!(started.elapsed() >= Duration::from_millis(5000));
    }
}
