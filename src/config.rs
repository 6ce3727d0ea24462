//! Configuration loading and parsing.
//!
//! [`EditorOptions`] can be built in code or read from a TOML file
//! (`stream-editor.toml` in the working directory, falling back to the
//! platform config directory). Every field has a default, unknown fields
//! are ignored, and a file that fails to parse falls back to defaults with
//! a warning so a bad config never blocks an editing session.
//!
//! ```toml
//! themes = ["vitesse-dark", "vitesse-light"]
//! languages = ["rust", "python"]
//! max_height = 400
//! reveal_strategy = "bottom"
//! reveal_batch_on_idle_ms = 120
//! ```

use crate::surface::RevealStrategy;
use crate::viewport::FollowOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fs;
use tracing::{info, warn};

/// File name looked up by [`discover`].
pub const CONFIG_FILE_NAME: &str = "stream-editor.toml";

/// Options shared by the composition root and both managers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Registered themes; the first two form the dark/light pair.
    pub themes: Vec<String>,
    /// Language allow-list.
    pub languages: Vec<String>,
    /// Explicit initial theme. When unset the preference signal decides.
    pub theme: Option<String>,
    /// Upper bound of the fitted view height in pixels.
    pub max_height: f64,
    /// Extra pixels added to the fitted height.
    pub height_padding: f64,
    /// Create views read-only (edits bypass the undo stack).
    pub read_only: bool,
    /// Reveal new content as it arrives.
    pub auto_scroll_on_update: bool,
    /// Start following when a buffer is created.
    pub auto_scroll_initial: bool,
    /// Bottom threshold in pixels.
    pub auto_scroll_threshold_px: f64,
    /// Bottom threshold in lines.
    pub auto_scroll_threshold_lines: u32,
    /// Reveal coalescing window.
    pub reveal_debounce_ms: u64,
    /// Quiet period before revealing, if set.
    pub reveal_batch_on_idle_ms: Option<u64>,
    /// How revealed lines are scrolled into sight.
    pub reveal_strategy: RevealStrategy,
    /// Minimum interval between update flushes (0 = every frame).
    pub update_throttle_ms: u64,
    /// Follow the modified side of comparison views.
    pub diff_auto_scroll: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            themes: vec!["vitesse-dark".to_owned(), "vitesse-light".to_owned()],
            languages: [
                "plaintext",
                "javascript",
                "typescript",
                "json",
                "markdown",
                "python",
                "rust",
                "shell",
                "html",
                "css",
            ]
            .iter()
            .map(|&lang| lang.to_owned())
            .collect(),
            theme: None,
            max_height: 500.0,
            height_padding: 2.0,
            read_only: true,
            auto_scroll_on_update: true,
            auto_scroll_initial: true,
            auto_scroll_threshold_px: 32.0,
            auto_scroll_threshold_lines: 2,
            reveal_debounce_ms: 75,
            reveal_batch_on_idle_ms: None,
            reveal_strategy: RevealStrategy::CenterIfOutside,
            update_throttle_ms: 0,
            diff_auto_scroll: true,
        }
    }
}

impl EditorOptions {
    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid stream editor options")
    }

    /// Follower configuration derived from these options.
    pub fn follow_options(&self) -> FollowOptions {
        FollowOptions {
            auto_scroll_on_update: self.auto_scroll_on_update,
            auto_scroll_initial: self.auto_scroll_initial,
            threshold_px: self.auto_scroll_threshold_px,
            threshold_lines: self.auto_scroll_threshold_lines,
            reveal_debounce: Duration::from_millis(self.reveal_debounce_ms),
            reveal_batch_on_idle: self.reveal_batch_on_idle_ms.map(Duration::from_millis),
            strategy: self.reveal_strategy,
            max_height: self.max_height,
            height_padding: self.height_padding,
        }
    }

    /// Follower configuration for the modified side of comparison views.
    pub fn diff_follow_options(&self) -> FollowOptions {
        FollowOptions {
            auto_scroll_on_update: self.auto_scroll_on_update && self.diff_auto_scroll,
            ..self.follow_options()
        }
    }

    /// Minimum interval between update flushes.
    pub const fn update_throttle(&self) -> Duration {
        Duration::from_millis(self.update_throttle_ms)
    }

    /// Check if `language` is on the allow-list.
    pub fn allows_language(&self, language: &str) -> bool {
        self.languages.iter().any(|lang| lang == language)
    }
}

/// Best-effort config path: working directory first, then the platform
/// config directory (XDG / Application Support / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir().map_or(local, |dir| dir.join("stream-editor").join(CONFIG_FILE_NAME))
}

/// Load options from `path` (or [`discover`]).
///
/// A missing file yields defaults. A malformed file yields defaults and a
/// warning.
pub fn load_from(path: Option<&Path>) -> Result<EditorOptions> {
    let path = path.map_or_else(discover, Path::to_path_buf);
    let Ok(text) = fs::read_to_string(&path) else {
        return Ok(EditorOptions::default());
    };
    match EditorOptions::from_toml_str(&text) {
        Ok(options) => {
            info!(target: "stream_editor::config", path = %path.display(), "options_loaded");
            Ok(options)
        }
        Err(err) => {
            warn!(target: "stream_editor::config", path = %path.display(), error = %err, "options_invalid_using_defaults");
            Ok(EditorOptions::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing_file() {
        let options = load_from(Some(Path::new("__nonexistent_stream_editor__.toml"))).unwrap();
        assert_eq!(options, EditorOptions::default());
        assert_eq!(options.themes.len(), 2);
        assert_eq!(options.reveal_debounce_ms, 75);
    }

    #[test]
    fn test_discover_falls_back_to_platform_dir() {
        if Path::new(CONFIG_FILE_NAME).exists() {
            return;
        }
        let expected = dirs::config_dir().map_or_else(
            || PathBuf::from(CONFIG_FILE_NAME),
            |dir| dir.join("stream-editor").join(CONFIG_FILE_NAME),
        );
        assert_eq!(discover(), expected);
    }

    #[test]
    fn test_parses_partial_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(
            tmp.path(),
            "max_height = 320\nreveal_strategy = \"bottom\"\nreveal_batch_on_idle_ms = 120\nlanguages = [\"rust\"]\n",
        )
        .unwrap();
        let options = load_from(Some(tmp.path())).unwrap();
        assert!((options.max_height - 320.0).abs() < f64::EPSILON);
        assert_eq!(options.reveal_strategy, RevealStrategy::Bottom);
        assert_eq!(options.languages, vec!["rust".to_owned()]);
        assert!(options.read_only);

        let follow = options.follow_options();
        assert_eq!(follow.reveal_batch_on_idle, Some(Duration::from_millis(120)));
        assert!((follow.max_height - 320.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        fs::write(tmp.path(), "max_height = \"tall\"\n").unwrap();
        let options = load_from(Some(tmp.path())).unwrap();
        assert_eq!(options, EditorOptions::default());
        assert!(EditorOptions::from_toml_str("max_height = \"tall\"").is_err());
    }

    #[test]
    fn test_diff_follow_respects_diff_auto_scroll() {
        let options = EditorOptions {
            diff_auto_scroll: false,
            ..EditorOptions::default()
        };
        assert!(options.follow_options().auto_scroll_on_update);
        assert!(!options.diff_follow_options().auto_scroll_on_update);
    }
}
