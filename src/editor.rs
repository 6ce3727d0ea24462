//! Stream editor: The composition root.
//!
//! [`StreamEditor`] owns the surface, the highlighter registry, the theme
//! set and one manager of each kind. It is the public surface hosts drive:
//! create views, feed content, switch language or theme, and call
//! [`on_frame`](StreamEditor::on_frame) once per rendering frame.

use crate::config::EditorOptions;
use crate::error::{Error, Result};
use crate::highlight::{HighlightError, HighlighterFactory, HighlighterRegistry};
use crate::manager::{DiffEditorManager, EditorManager, UpdateEffects};
use crate::surface::{DiffView, EditorSurface, EditorView};
use crate::theme::{PreferenceSource, ThemeSet};
use crossbeam_channel::Receiver;
use std::time::Instant;
use tracing::{debug, warn};

type Model<S> = <<S as EditorSurface>::Editor as EditorView>::Model;
type DiffModel<S> = <<S as EditorSurface>::DiffEditor as DiffView>::Model;

/// Streaming code editor over an [`EditorSurface`].
pub struct StreamEditor<S: EditorSurface, F: HighlighterFactory> {
    /// The editing surface.
    surface: S,
    /// Highlighter cache and registration state.
    registry: HighlighterRegistry<F>,
    /// Configuration shared with the managers.
    options: EditorOptions,
    /// Known themes and the active one.
    themes: ThemeSet,
    /// Dark-mode preference changes.
    preference: Receiver<bool>,
    /// Single-buffer manager.
    editor: EditorManager<S::Editor>,
    /// Comparison-view manager.
    diff: DiffEditorManager<S::DiffEditor>,
}

impl<S: EditorSurface, F: HighlighterFactory> std::fmt::Debug for StreamEditor<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamEditor")
            .field("themes", &self.themes)
            .field("editor", &self.editor)
            .field("diff", &self.diff)
            .finish_non_exhaustive()
    }
}

impl<S: EditorSurface, F: HighlighterFactory> StreamEditor<S, F> {
    /// Cancel all work and dispose every view.
    pub fn cleanup(&mut self) {
        self.editor.cleanup();
        self.diff.cleanup();
    }

    /// Cancel pending work and reset auto-scroll state, keeping the views.
    pub fn safe_clean(&mut self) {
        self.editor.safe_clean();
        self.diff.safe_clean();
    }
}

impl<S, F> StreamEditor<S, F>
where
    S: EditorSurface,
    F: HighlighterFactory<Highlighter = S::Highlighter>,
{
    /// Create an editor over `surface`.
    ///
    /// Fails if fewer than two themes are configured. The initial theme is
    /// `options.theme`, or the dark/light pair entry matching `preference`.
    pub fn new<P: PreferenceSource>(
        mut surface: S,
        factory: F,
        options: EditorOptions,
        preference: &P,
    ) -> Result<Self> {
        let themes = ThemeSet::new(options.themes.clone(), options.theme.as_deref(), preference.is_dark())?;
        surface.set_theme(themes.current());
        debug!(target: "stream_editor::theme", theme = themes.current(), "initial_theme");

        Ok(Self {
            surface,
            registry: HighlighterRegistry::new(factory),
            editor: EditorManager::new(options.clone()),
            diff: DiffEditorManager::new(options.clone()),
            options,
            themes,
            preference: preference.subscribe(),
        })
    }

    /// The editing surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the editing surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The highlighter registry.
    pub const fn registry(&self) -> &HighlighterRegistry<F> {
        &self.registry
    }

    /// The configuration.
    pub const fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// The single-buffer manager.
    pub const fn editor_manager(&self) -> &EditorManager<S::Editor> {
        &self.editor
    }

    /// The comparison-view manager.
    pub const fn diff_manager(&self) -> &DiffEditorManager<S::DiffEditor> {
        &self.diff
    }

    /// The single editor, if created.
    pub const fn editor(&self) -> Option<&S::Editor> {
        self.editor.view()
    }

    /// Mutable access to the single editor.
    pub fn editor_mut(&mut self) -> Option<&mut S::Editor> {
        self.editor.view_mut()
    }

    /// The comparison view, if created.
    pub const fn diff_editor(&self) -> Option<&S::DiffEditor> {
        self.diff.view()
    }

    /// Mutable access to the comparison view.
    pub fn diff_editor_mut(&mut self) -> Option<&mut S::DiffEditor> {
        self.diff.view_mut()
    }

    /// The single editor's model.
    pub fn model(&self) -> Option<&Model<S>> {
        self.editor.model()
    }

    /// The comparison view's `(original, modified)` models.
    pub fn diff_models(&self) -> Option<(&DiffModel<S>, &DiffModel<S>)> {
        self.diff.original_model().zip(self.diff.modified_model())
    }

    /// The active theme.
    pub fn current_theme(&self) -> &str {
        self.themes.current()
    }

    /// All known themes.
    pub fn themes(&self) -> &[String] {
        self.themes.themes()
    }

    /// Number of cached highlighter constructions.
    pub fn highlighter_cache_size(&self) -> usize {
        self.registry.cache().len()
    }

    /// Drop every cached highlighter construction.
    pub fn clear_highlighter_cache(&self) {
        self.registry.cache().clear();
    }

    async fn register(&mut self) -> std::result::Result<bool, HighlightError> {
        self.registry
            .register(&mut self.surface, self.themes.themes(), &self.options.languages)
            .await
    }

    fn check_language(&self, language: &str) -> Result<()> {
        if self.options.allows_language(language) {
            Ok(())
        } else {
            Err(Error::UnknownLanguage(language.to_owned()))
        }
    }

    /// `language` if it is allowed; warns and returns `None` otherwise.
    fn allowed<'a>(&self, language: Option<&'a str>) -> Option<&'a str> {
        let language = language?;
        if self.options.allows_language(language) {
            Some(language)
        } else {
            warn!(target: "stream_editor::manager", language, "language_not_allowed");
            None
        }
    }

    /// Create the single editor in `container`.
    ///
    /// Waits for highlighter registration before creating the view; a
    /// previous single editor is disposed.
    pub async fn create_editor(
        &mut self,
        container: S::Container,
        code: &str,
        language: &str,
    ) -> Result<&S::Editor> {
        self.check_language(language)?;
        self.register().await?;

        self.surface.set_theme(self.themes.current());
        self.editor
            .create(&mut self.surface, container, code, language, self.themes.current());
        self.editor.view().ok_or(Error::NoEditor)
    }

    /// Create the comparison view in `container`.
    pub async fn create_diff_editor(
        &mut self,
        container: S::Container,
        original: &str,
        modified: &str,
        language: &str,
    ) -> Result<&S::DiffEditor> {
        self.check_language(language)?;
        self.register().await?;

        self.surface.set_theme(self.themes.current());
        self.diff.create(
            &mut self.surface,
            container,
            original,
            modified,
            language,
            self.themes.current(),
        );
        self.diff.view().ok_or(Error::NoEditor)
    }

    /// Replace the single editor's content on the next frame.
    pub fn update_code(&mut self, code: impl Into<String>, language: Option<&str>) {
        let language = self.allowed(language);
        self.editor.update_content(code, language);
    }

    /// Append to the single editor now.
    pub fn append_code(&mut self, code: &str, language: Option<&str>) {
        let language = self.allowed(language);
        self.editor.append_content(code, language);
    }

    /// Update both sides of the comparison view.
    pub fn update_diff(
        &mut self,
        original: impl Into<String>,
        modified: impl Into<String>,
        language: Option<&str>,
    ) {
        let language = self.allowed(language);
        self.diff.update_diff(original, modified, language);
    }

    /// Update the original side now.
    pub fn update_original(&mut self, content: impl Into<String>) -> UpdateEffects {
        self.diff.update_original(content)
    }

    /// Update the modified side now.
    pub fn update_modified(&mut self, content: impl Into<String>) -> UpdateEffects {
        self.diff.update_modified(content)
    }

    /// Append to the original side now.
    pub fn append_original(&mut self, text: &str) {
        self.diff.append_original(text);
    }

    /// Append to the modified side now.
    pub fn append_modified(&mut self, text: &str) {
        self.diff.append_modified(text);
    }

    /// Switch the language of every view, if allowed.
    pub fn set_language(&mut self, language: &str) -> bool {
        if self.allowed(Some(language)).is_none() {
            return false;
        }
        let single = self.editor.set_language(language, &self.options.languages);
        let diff = self.diff.set_language(language, &self.options.languages);
        single || diff
    }

    /// Activate `theme`, registering it first if it is new.
    ///
    /// Stops following the dark-mode preference. Returns `false` (and
    /// warns) if registration fails; the active theme is then unchanged.
    pub async fn set_theme(&mut self, theme: &str) -> bool {
        if !self.themes.contains(theme) {
            let previous = self.themes.clone();
            self.themes.include(theme);
            if let Err(cause) = self.register().await {
                let error = Error::UnknownTheme(theme.to_owned());
                warn!(target: "stream_editor::theme", %error, %cause, "set_theme_failed");
                self.themes = previous;
                return false;
            }
        }
        self.themes.select(theme);
        self.surface.set_theme(theme);
        debug!(target: "stream_editor::theme", theme, "theme_changed");
        true
    }

    /// Run one frame: apply preference changes, then flush both managers.
    pub fn on_frame(&mut self, now: Instant) -> UpdateEffects {
        if let Some(dark) = self.preference.try_iter().last() {
            if let Some(theme) = self.themes.on_preference(dark) {
                self.surface.set_theme(theme);
            }
        }
        self.editor.on_frame(now) | self.diff.on_frame(now)
    }
}

impl<S: EditorSurface, F: HighlighterFactory> Drop for StreamEditor<S, F> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::memory::{MemoryHighlighterFactory, MemorySurface};
    use crate::surface::TextModel;
    use crate::testing::capture_logs;
    use crate::theme::DarkModeSignal;
    use futures::executor::block_on;

    type Editor = StreamEditor<MemorySurface, MemoryHighlighterFactory>;

    fn setup(options: EditorOptions, signal: &DarkModeSignal) -> Editor {
        StreamEditor::new(MemorySurface::new(), MemoryHighlighterFactory::new(), options, signal).unwrap()
    }

    #[test]
    fn test_needs_dark_light_pair() {
        let options = EditorOptions {
            themes: vec!["only".to_owned()],
            ..EditorOptions::default()
        };
        let err = StreamEditor::new(
            MemorySurface::new(),
            MemoryHighlighterFactory::new(),
            options,
            &DarkModeSignal::new(true),
        )
        .unwrap_err();
        assert_eq!(err, Error::NotEnoughThemes(1));
    }

    #[test]
    fn test_create_registers_once() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        assert_eq!(editor.current_theme(), "vitesse-dark");

        block_on(editor.create_editor("a".to_owned(), "fn main() {}\n", "rust")).unwrap();
        block_on(editor.create_diff_editor("b".to_owned(), "", "", "rust")).unwrap();

        assert_eq!(editor.registry().cache().factory().created(), 1);
        assert_eq!(editor.surface().bindings().len(), 1);
        assert_eq!(editor.surface().theme(), Some("vitesse-dark"));
        assert_eq!(editor.highlighter_cache_size(), 1);
        assert_eq!(editor.model().unwrap().language(), "rust");
    }

    #[test]
    fn test_create_rejects_unknown_language() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        let err = block_on(editor.create_editor("a".to_owned(), "", "cobol")).unwrap_err();
        assert_eq!(err, Error::UnknownLanguage("cobol".to_owned()));
        assert!(editor.editor().is_none());
    }

    #[test]
    fn test_create_surfaces_highlighter_failure() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        editor.registry().cache().factory().fail_next();

        let err = block_on(editor.create_editor("a".to_owned(), "", "rust")).unwrap_err();
        assert!(matches!(err, Error::Highlighter(_)));
        assert!(editor.editor().is_none());

        // Retry succeeds.
        assert!(block_on(editor.create_editor("a".to_owned(), "", "rust")).is_ok());
    }

    #[test]
    fn test_preference_switches_theme_on_frame() {
        let signal = DarkModeSignal::new(false);
        let mut editor = setup(EditorOptions::default(), &signal);
        assert_eq!(editor.current_theme(), "vitesse-light");

        signal.set_dark(true);
        editor.on_frame(Instant::now());
        assert_eq!(editor.current_theme(), "vitesse-dark");
        assert_eq!(editor.surface().theme(), Some("vitesse-dark"));

        assert!(block_on(editor.set_theme("vitesse-light")));
        signal.set_dark(false);
        signal.set_dark(true);
        editor.on_frame(Instant::now());
        assert_eq!(editor.current_theme(), "vitesse-light");
    }

    #[test]
    fn test_set_theme_registers_new_theme() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        block_on(editor.create_editor("a".to_owned(), "", "rust")).unwrap();

        assert!(block_on(editor.set_theme("nord")));
        assert_eq!(editor.current_theme(), "nord");
        assert!(editor.themes().iter().any(|t| t == "nord"));
        assert_eq!(editor.highlighter_cache_size(), 2);
        assert_eq!(editor.surface().theme(), Some("nord"));
    }

    #[test]
    fn test_set_theme_failure_warns_and_keeps_theme() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        editor.registry().cache().factory().fail_next();

        let (applied, logs) = capture_logs(|| block_on(editor.set_theme("nord")));
        assert!(!applied);
        assert!(logs.contains("set_theme_failed"));
        assert!(logs.contains("theme `nord` is not registered"));
        assert_eq!(editor.current_theme(), "vitesse-dark");
        assert!(!editor.themes().iter().any(|t| t == "nord"));
    }

    #[test]
    fn test_streaming_through_root() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        block_on(editor.create_editor("a".to_owned(), "", "rust")).unwrap();

        editor.append_code("fn main() {\n", None);
        editor.update_code("fn main() {\n}\n", Some("rust"));
        let effects = editor.on_frame(Instant::now());
        assert!(effects.contains(UpdateEffects::APPEND_FAST_PATH));
        assert_eq!(editor.model().unwrap().value(), "fn main() {\n}\n");

        // Disallowed language is dropped with a warning; content still applies.
        let (_, logs) = capture_logs(|| editor.update_code("fn main() {}\n", Some("cobol")));
        assert!(logs.contains("language_not_allowed"));
        editor.on_frame(Instant::now());
        assert_eq!(editor.model().unwrap().value(), "fn main() {}\n");
        assert_eq!(editor.model().unwrap().language(), "rust");
    }

    #[test]
    fn test_diff_through_root() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        block_on(editor.create_diff_editor("d".to_owned(), "", "", "plaintext")).unwrap();

        editor.append_modified("out1\n");
        editor.append_modified("out2\n");
        editor.append_original("in\n");
        let (original, modified) = editor.diff_models().unwrap();
        assert_eq!(original.value(), "in\n");
        assert_eq!(modified.value(), "out1\nout2\n");

        assert!(editor.set_language("python"));
        assert_eq!(editor.diff_models().unwrap().0.language(), "python");
    }

    #[test]
    fn test_disallowed_language_warns_once() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        block_on(editor.create_editor("a".to_owned(), "", "rust")).unwrap();
        block_on(editor.create_diff_editor("d".to_owned(), "", "", "rust")).unwrap();

        let (applied, logs) = capture_logs(|| editor.set_language("cobol"));
        assert!(!applied);
        assert_eq!(logs.matches("language_not_allowed").count(), 1);
        assert_eq!(editor.model().unwrap().language(), "rust");
        assert_eq!(editor.diff_models().unwrap().1.language(), "rust");
    }

    #[test]
    fn test_cleanup_and_cache_clear() {
        let signal = DarkModeSignal::new(true);
        let mut editor = setup(EditorOptions::default(), &signal);
        block_on(editor.create_editor("a".to_owned(), "x", "rust")).unwrap();

        editor.clear_highlighter_cache();
        assert_eq!(editor.highlighter_cache_size(), 0);

        editor.cleanup();
        assert!(editor.editor().is_none());
        assert!(editor.diff_models().is_none());
    }
}
