//! Single-buffer manager: One view, one model, streamed updates.

use super::{
    append_text_edit, full_text_edit, minimal_text_edit, FrameKind, FrameTask, PendingUpdate,
    UpdateEffects,
};
use crate::config::EditorOptions;
use crate::edit::AppendBuffer;
use crate::schedule::FrameScheduler;
use crate::surface::{EditorSurface, EditorView, SurfaceEvent, TextEdit, TextModel, ViewOptions};
use crate::viewport::ViewportFollower;
use crossbeam_channel::Receiver;
use std::time::Instant;
use tracing::{debug, trace, warn};

const TARGET: &str = "stream_editor::manager";

/// Apply edits the way the view expects: read-only views bypass the undo
/// stack.
fn apply_edits<V: EditorView>(view: &mut V, edits: &[TextEdit]) {
    if view.is_read_only() {
        view.model_mut().apply_edits(edits);
    } else {
        view.execute_edits(edits);
    }
}

/// Owns one editor view and keeps it in sync with streamed content.
///
/// Nothing happens between frames except appends: updates are stored and
/// flushed by [`on_frame`](Self::on_frame), last write wins.
pub struct EditorManager<V: EditorView> {
    /// Configuration.
    options: EditorOptions,
    /// The managed view, once created.
    editor: Option<V>,
    /// Scroll/size listener; `None` while detached.
    events: Option<Receiver<SurfaceEvent>>,
    /// Work waiting for the next frame.
    scheduler: FrameScheduler<FrameKind, FrameTask<PendingUpdate>>,
    /// Auto-scroll state.
    follower: ViewportFollower,
    /// Content as of the last applied update.
    last_known: String,
    /// Fragments appended since the last append flush.
    appends: AppendBuffer,
    /// Time of the last update flush (for throttling).
    last_flush: Option<Instant>,
    /// Effects of the last frame that did anything.
    last_effects: UpdateEffects,
    /// Height the view was last fitted to.
    height: f64,
}

impl<V: EditorView> std::fmt::Debug for EditorManager<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorManager")
            .field("created", &self.editor.is_some())
            .field("listening", &self.events.is_some())
            .field("scheduler", &self.scheduler)
            .field("follower", &self.follower.state())
            .field("last_effects", &self.last_effects)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl<V: EditorView> EditorManager<V> {
    /// Create a manager with no view.
    pub fn new(options: EditorOptions) -> Self {
        let follower = ViewportFollower::new(options.follow_options());
        Self {
            options,
            editor: None,
            events: None,
            scheduler: FrameScheduler::new(),
            follower,
            last_known: String::new(),
            appends: AppendBuffer::new(),
            last_flush: None,
            last_effects: UpdateEffects::empty(),
            height: 0.0,
        }
    }

    /// Create the view, replacing any previous one.
    ///
    /// The previous view is disposed first. The new view is fitted to its
    /// content, the follower is re-armed and the scroll listener installed.
    pub fn create<S>(
        &mut self,
        surface: &mut S,
        container: S::Container,
        content: &str,
        language: &str,
        theme: &str,
    ) where
        S: EditorSurface<Editor = V>,
    {
        self.cleanup();

        let view_options = ViewOptions {
            language: language.to_owned(),
            theme: theme.to_owned(),
            read_only: self.options.read_only,
            max_height: self.options.max_height,
        };
        let mut editor = surface.create_editor(container, content, &view_options);
        self.events = Some(editor.subscribe());
        self.follower
            .sync_metrics(editor.scroll_metrics(), editor.model().line_count());
        content.clone_into(&mut self.last_known);
        self.editor = Some(editor);
        self.fit_height();

        debug!(
            target: TARGET,
            language,
            theme,
            lines = self.follower.metrics().line_count,
            height = self.height,
            "editor_created"
        );
    }

    /// The managed view.
    pub const fn view(&self) -> Option<&V> {
        self.editor.as_ref()
    }

    /// Mutable access to the managed view.
    pub fn view_mut(&mut self) -> Option<&mut V> {
        self.editor.as_mut()
    }

    /// The view's model.
    pub fn model(&self) -> Option<&V::Model> {
        self.editor.as_ref().map(EditorView::model)
    }

    /// Current language of the model.
    pub fn language(&self) -> Option<&str> {
        self.model().map(TextModel::language)
    }

    /// Effects of the most recent frame that changed something.
    pub const fn last_effects(&self) -> UpdateEffects {
        self.last_effects
    }

    /// The viewport follower.
    pub const fn follower(&self) -> &ViewportFollower {
        &self.follower
    }

    /// Height the view was last fitted to.
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Check if work of `kind` waits for the next frame.
    pub fn is_pending(&self, kind: FrameKind) -> bool {
        self.scheduler.is_pending(&kind)
    }

    /// Store `content` as the pending update.
    ///
    /// Replaces any update still waiting for the frame.
    pub fn update_content(&mut self, content: impl Into<String>, language: Option<&str>) {
        self.ensure_listener();
        let update = PendingUpdate {
            content: content.into(),
            language: language.map(str::to_owned),
        };
        if self.scheduler.schedule(FrameKind::Update, FrameTask::Flush(update)) {
            trace!(target: TARGET, "update_coalesced");
        }
    }

    /// Append `text` to the buffer now.
    ///
    /// The edit is visible immediately; re-measuring and revealing are
    /// batched to the next frame.
    pub fn append_content(&mut self, text: &str, language: Option<&str>) {
        if text.is_empty() {
            return;
        }
        self.ensure_listener();
        let Some(editor) = self.editor.as_mut() else {
            trace!(target: TARGET, "append_without_editor");
            return;
        };
        if let Some(language) = language {
            if language != editor.model().language() {
                editor.model_mut().set_language(language);
            }
        }
        let edit = append_text_edit(editor.model(), text);
        apply_edits(editor, &[edit]);

        self.last_known.push_str(text);
        self.appends.push(text);
        self.scheduler.schedule(FrameKind::Append, FrameTask::Append);
    }

    /// Switch the model's language if `language` is in `allowed`.
    ///
    /// Otherwise warns and leaves the model alone. Returns `true` if the
    /// language is now active.
    pub fn set_language(&mut self, language: &str, allowed: &[String]) -> bool {
        if !allowed.iter().any(|lang| lang == language) {
            warn!(target: TARGET, language, "language_not_allowed");
            return false;
        }
        let Some(editor) = self.editor.as_mut() else {
            debug!(target: TARGET, language, "set_language_without_editor");
            return false;
        };
        if editor.model().language() != language {
            editor.model_mut().set_language(language);
            debug!(target: TARGET, language, "language_changed");
        }
        true
    }

    /// Run one frame: drain surface events, then flush everything
    /// scheduled before this tick.
    pub fn on_frame(&mut self, now: Instant) -> UpdateEffects {
        self.pump_events();

        let mut effects = UpdateEffects::empty();
        for (_, task) in self.scheduler.take_frame() {
            effects |= match task {
                FrameTask::Flush(update) => self.flush_update(update, now),
                FrameTask::Append => self.flush_append(),
                FrameTask::Reveal => {
                    self.flush_reveal(now);
                    UpdateEffects::empty()
                }
            };
        }
        if !effects.is_empty() {
            self.last_effects = effects;
        }
        effects
    }

    /// Cancel all work, dispose the view and reset every cached value.
    pub fn cleanup(&mut self) {
        self.scheduler.cancel_all();
        self.appends.clear();
        self.events = None;
        if let Some(mut editor) = self.editor.take() {
            editor.dispose();
            debug!(target: TARGET, "editor_disposed");
        }
        self.follower.clear();
        self.last_known.clear();
        self.last_flush = None;
        self.last_effects = UpdateEffects::empty();
        self.height = 0.0;
    }

    /// Cancel pending work and reset auto-scroll state, keeping the view.
    ///
    /// The scroll listener is detached; the next update re-arms it.
    pub fn safe_clean(&mut self) {
        self.scheduler.cancel_all();
        self.appends.clear();
        self.events = None;
        self.follower.reset();
        self.last_flush = None;
        debug!(target: TARGET, "editor_safe_cleaned");
    }

    fn ensure_listener(&mut self) {
        if self.events.is_some() {
            return;
        }
        if let Some(editor) = self.editor.as_mut() {
            self.events = Some(editor.subscribe());
            self.follower
                .sync_metrics(editor.scroll_metrics(), editor.model().line_count());
            trace!(target: TARGET, "listener_rearmed");
        }
    }

    fn pump_events(&mut self) {
        if let Some(events) = &self.events {
            for event in events.try_iter() {
                self.follower.on_event(event);
            }
        }
    }

    fn flush_update(&mut self, update: PendingUpdate, now: Instant) -> UpdateEffects {
        if let Some(last) = self.last_flush {
            if now.saturating_duration_since(last) < self.options.update_throttle() {
                self.scheduler.schedule(FrameKind::Update, FrameTask::Flush(update));
                return UpdateEffects::empty();
            }
        }
        let Some(editor) = self.editor.as_ref() else {
            trace!(target: TARGET, "update_without_editor");
            return UpdateEffects::empty();
        };
        let lines_before = editor.model().line_count();
        let language = update
            .language
            .filter(|language| language != editor.model().language());
        let content = update.content;
        self.last_flush = Some(now);

        let mut effects = if let Some(language) = language {
            self.replace_all(&language, content)
        } else if content == self.last_known {
            trace!(target: TARGET, "update_unchanged");
            return UpdateEffects::empty();
        } else if content.starts_with(self.last_known.as_str()) {
            let suffix = &content[self.last_known.len()..];
            self.append_content(suffix, None);
            UpdateEffects::APPEND_FAST_PATH | UpdateEffects::CONTENT
        } else {
            self.apply_minimal(content)
        };

        let lines = self.model().map_or(lines_before, TextModel::line_count);
        if lines != lines_before {
            effects |= UpdateEffects::LINE_COUNT;
            // Appends are measured by their own flush.
            if !effects.contains(UpdateEffects::APPEND_FAST_PATH) {
                self.on_line_count_changed(lines);
            }
        }
        debug!(target: TARGET, effects = ?effects, lines, "update_flushed");
        effects
    }

    fn replace_all(&mut self, language: &str, content: String) -> UpdateEffects {
        let Some(editor) = self.editor.as_mut() else {
            return UpdateEffects::empty();
        };
        editor.model_mut().set_language(language);
        let edit = full_text_edit(editor.model(), &content);
        apply_edits(editor, &[edit]);
        self.last_known = content;
        debug!(target: TARGET, language, "update_full_replace");
        UpdateEffects::LANGUAGE | UpdateEffects::FULL_REPLACE | UpdateEffects::CONTENT
    }

    fn apply_minimal(&mut self, content: String) -> UpdateEffects {
        let Some(editor) = self.editor.as_mut() else {
            return UpdateEffects::empty();
        };
        let Some(edit) = minimal_text_edit(editor.model(), &self.last_known, &content) else {
            return UpdateEffects::empty();
        };
        trace!(
            target: TARGET,
            start = ?edit.range.start,
            end = ?edit.range.end,
            bytes = edit.text.len(),
            "update_minimal_edit"
        );
        apply_edits(editor, &[edit]);
        self.last_known = content;
        UpdateEffects::MINIMAL_EDIT | UpdateEffects::CONTENT
    }

    fn flush_append(&mut self) -> UpdateEffects {
        let Some(batch) = self.appends.flush() else {
            return UpdateEffects::empty();
        };
        let Some(lines) = self.model().map(TextModel::line_count) else {
            return UpdateEffects::empty();
        };
        trace!(target: TARGET, bytes = batch.len(), lines, "append_flushed");

        if lines == self.follower.metrics().line_count {
            return UpdateEffects::empty();
        }
        self.on_line_count_changed(lines);
        UpdateEffects::LINE_COUNT
    }

    fn on_line_count_changed(&mut self, lines: usize) {
        self.follower.set_line_count(lines);
        self.fit_height();
        if self.follower.maybe_reveal_line(None) {
            self.scheduler.schedule(FrameKind::Reveal, FrameTask::Reveal);
        }
    }

    fn flush_reveal(&mut self, now: Instant) {
        match self.follower.poll_reveal(now) {
            Some(request) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.reveal_line(request.line, request.strategy);
                    debug!(target: TARGET, line = request.line, "line_revealed");
                }
            }
            None if self.follower.has_pending_reveal() => {
                self.scheduler.schedule(FrameKind::Reveal, FrameTask::Reveal);
            }
            None => {}
        }
    }

    /// Resize the view to its content. Returns `true` if the height changed.
    fn fit_height(&mut self) -> bool {
        let height = self.follower.computed_height();
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        if (height - self.height).abs() <= f64::EPSILON {
            return false;
        }
        self.height = height;
        editor.set_height(height);
        self.follower.set_viewport_height(height);
        true
    }
}

impl<V: EditorView> Drop for EditorManager<V> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::memory::{MemoryEditor, MemorySurface, DEFAULT_LINE_HEIGHT};
    use crate::surface::{Position, TextRange};
    use crate::testing::capture_logs;
    use crate::viewport::FollowState;
    use proptest::prelude::*;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    fn setup_with(options: EditorOptions, content: &str) -> (MemorySurface, EditorManager<MemoryEditor>) {
        let mut surface = MemorySurface::new();
        let mut manager = EditorManager::new(options);
        manager.create(&mut surface, "editor".to_owned(), content, "plaintext", "vitesse-dark");
        (surface, manager)
    }

    fn setup(content: &str) -> (MemorySurface, EditorManager<MemoryEditor>) {
        setup_with(EditorOptions::default(), content)
    }

    fn value(manager: &EditorManager<MemoryEditor>) -> String {
        manager.model().unwrap().value()
    }

    /// Run `count` frames `step` apart starting at `start`; returns the time after.
    fn run_frames(manager: &mut EditorManager<MemoryEditor>, start: Instant, count: u32, step: Duration) -> Instant {
        let mut now = start;
        for _ in 0..count {
            manager.on_frame(now);
            now += step;
        }
        now
    }

    fn lines(count: usize) -> String {
        (1..=count).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn test_update_takes_append_fast_path() {
        let (_surface, mut manager) = setup("line1\n");
        manager.update_content("line1\nline2\n", Some("plaintext"));

        // Nothing changes before the frame.
        assert_eq!(value(&manager), "line1\n");

        let effects = manager.on_frame(Instant::now());
        assert_eq!(value(&manager), "line1\nline2\n");
        assert!(effects.contains(UpdateEffects::APPEND_FAST_PATH));
        assert!(!effects.contains(UpdateEffects::MINIMAL_EDIT));

        let log = manager.model().unwrap().edit_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].range, TextRange::caret(Position::new(2, 1)));
        assert_eq!(log[0].text, "line2\n");
    }

    #[test]
    fn test_update_applies_single_middle_replace() {
        let (_surface, mut manager) = setup("aXc");
        manager.update_content("aYc", None);
        let effects = manager.on_frame(Instant::now());

        assert_eq!(value(&manager), "aYc");
        assert_eq!(effects, UpdateEffects::MINIMAL_EDIT | UpdateEffects::CONTENT);

        let log = manager.model().unwrap().edit_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].range, TextRange::new(Position::new(1, 2), Position::new(1, 3)));
        assert_eq!(log[0].text, "Y");
    }

    #[test]
    fn test_pending_update_last_write_wins() {
        let (_surface, mut manager) = setup("");
        manager.update_content("first", None);
        manager.update_content("second", None);
        assert!(manager.is_pending(FrameKind::Update));

        manager.on_frame(Instant::now());
        assert_eq!(value(&manager), "second");
        assert_eq!(manager.model().unwrap().edit_log().len(), 1);
        assert!(!manager.is_pending(FrameKind::Update));
    }

    #[test]
    fn test_language_change_forces_full_replace() {
        let (_surface, mut manager) = setup("let a = 1;\n");
        manager.update_content("let a = 1;\nlet b = 2;\n", Some("rust"));
        let effects = manager.on_frame(Instant::now());

        assert!(effects.contains(UpdateEffects::LANGUAGE | UpdateEffects::FULL_REPLACE));
        assert!(!effects.contains(UpdateEffects::APPEND_FAST_PATH));
        assert_eq!(manager.language(), Some("rust"));
        assert_eq!(value(&manager), "let a = 1;\nlet b = 2;\n");

        let log = manager.model().unwrap().edit_log();
        assert_eq!(log[0].range.start, Position::new(1, 1));
    }

    #[test]
    fn test_unchanged_update_is_noop() {
        let (_surface, mut manager) = setup("same");
        manager.update_content("same", Some("plaintext"));
        assert!(manager.on_frame(Instant::now()).is_empty());
        assert!(manager.model().unwrap().edit_log().is_empty());
    }

    #[test]
    fn test_append_is_visible_immediately() {
        let (_surface, mut manager) = setup("a\n");
        manager.append_content("b\n", None);
        manager.append_content("c\n", None);
        assert_eq!(value(&manager), "a\nb\nc\n");
        assert!(manager.is_pending(FrameKind::Append));

        let effects = manager.on_frame(Instant::now());
        assert_eq!(effects, UpdateEffects::LINE_COUNT);
        assert_eq!(manager.follower().metrics().line_count, 4);

        // Later updates diff against the appended text.
        manager.update_content("a\nb\nc\nd", None);
        let effects = manager.on_frame(Instant::now());
        assert!(effects.contains(UpdateEffects::APPEND_FAST_PATH));
        assert_eq!(value(&manager), "a\nb\nc\nd");
    }

    #[test]
    fn test_disallowed_language_warns_and_is_skipped() {
        let (_surface, mut manager) = setup("print('hi')\n");
        let allowed = vec!["javascript".to_owned()];

        let (applied, logs) = capture_logs(|| manager.set_language("python", &allowed));

        assert!(!applied);
        assert_eq!(manager.language(), Some("plaintext"));
        assert!(logs.contains("WARN"));
        assert!(logs.contains("stream_editor::manager"));
        assert!(logs.contains("language_not_allowed"));

        assert!(manager.set_language("javascript", &allowed));
        assert_eq!(manager.language(), Some("javascript"));
    }

    #[test]
    fn test_editable_view_uses_undo_stack() {
        let options = EditorOptions {
            read_only: false,
            ..EditorOptions::default()
        };
        let (_surface, mut manager) = setup_with(options, "x");
        manager.update_content("xy", None);
        manager.on_frame(Instant::now());
        assert_eq!(manager.view().unwrap().undo_stack().len(), 1);

        let (_surface, mut read_only) = setup("x");
        read_only.update_content("xy", None);
        read_only.on_frame(Instant::now());
        assert!(read_only.view().unwrap().undo_stack().is_empty());
    }

    #[test]
    fn test_height_fits_content_up_to_max() {
        let (_surface, mut manager) = setup("a\nb\n");
        let expected = 3.0 * DEFAULT_LINE_HEIGHT + 2.0;
        assert!((manager.height() - expected).abs() < f64::EPSILON);
        assert!((manager.view().unwrap().height() - expected).abs() < f64::EPSILON);

        manager.update_content(format!("a\nb\n{}", lines(100)), None);
        let now = run_frames(&mut manager, Instant::now(), 2, FRAME);
        manager.on_frame(now);
        assert!((manager.height() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_streaming_reveals_last_line_after_debounce() {
        let (_surface, mut manager) = setup("");
        let start = Instant::now();

        manager.update_content(lines(40), None);
        // Update, append bookkeeping, first reveal poll.
        let now = run_frames(&mut manager, start, 3, FRAME);
        assert!(manager.view().unwrap().reveals().is_empty());
        assert!(manager.is_pending(FrameKind::Reveal));

        run_frames(&mut manager, now, 6, FRAME);
        let reveals = manager.view().unwrap().reveals();
        assert_eq!(reveals.len(), 1);
        assert_eq!(reveals[0].0, 41);
        assert!(!manager.is_pending(FrameKind::Reveal));
    }

    #[test]
    fn test_user_scroll_up_pauses_reveals() {
        let (_surface, mut manager) = setup("");
        let start = Instant::now();
        manager.update_content(lines(40), None);
        let now = run_frames(&mut manager, start, 9, FRAME);
        assert_eq!(manager.view().unwrap().reveals().len(), 1);

        manager.view_mut().unwrap().scroll_to(100.0);
        manager.append_content(&lines(10), None);
        let now = run_frames(&mut manager, now, 9, FRAME);
        assert_eq!(manager.follower().state(), FollowState::Paused);
        assert_eq!(manager.view().unwrap().reveals().len(), 1);

        // Back at the bottom, following resumes.
        manager.view_mut().unwrap().scroll_to(10_000.0);
        manager.append_content(&lines(5), None);
        run_frames(&mut manager, now, 9, FRAME);
        assert_eq!(manager.follower().state(), FollowState::Following);
        assert_eq!(manager.view().unwrap().reveals().len(), 2);
    }

    #[test]
    fn test_update_throttle_carries_pending_update() {
        let options = EditorOptions {
            update_throttle_ms: 100,
            ..EditorOptions::default()
        };
        let (_surface, mut manager) = setup_with(options, "a");
        let start = Instant::now();

        manager.update_content("ab", None);
        manager.on_frame(start);
        assert_eq!(value(&manager), "ab");

        manager.update_content("abc", None);
        manager.on_frame(start + Duration::from_millis(20));
        assert_eq!(value(&manager), "ab");
        assert!(manager.is_pending(FrameKind::Update));

        manager.update_content("abcd", None);
        manager.on_frame(start + Duration::from_millis(120));
        assert_eq!(value(&manager), "abcd");
    }

    #[test]
    fn test_cleanup_disposes_and_resets() {
        let (_surface, mut manager) = setup("a");
        manager.update_content("ab", None);
        manager.cleanup();

        assert!(manager.view().is_none());
        assert!(!manager.is_pending(FrameKind::Update));
        assert!(manager.on_frame(Instant::now()).is_empty());
        assert!(manager.last_effects().is_empty());
        // Idempotent.
        manager.cleanup();
    }

    #[test]
    fn test_create_disposes_previous_view() {
        let (mut surface, mut manager) = setup("old");
        manager.create(&mut surface, "second".to_owned(), "new", "rust", "vitesse-light");
        assert_eq!(manager.view().unwrap().container(), "second");
        assert_eq!(value(&manager), "new");
        assert_eq!(manager.language(), Some("rust"));
    }

    #[test]
    fn test_safe_clean_keeps_view_and_rearms() {
        let (_surface, mut manager) = setup("a");
        manager.update_content("ab", None);
        manager.safe_clean();

        assert!(manager.view().is_some());
        assert!(!manager.is_pending(FrameKind::Update));
        assert!(manager.on_frame(Instant::now()).is_empty());
        assert_eq!(value(&manager), "a");

        manager.update_content("b", None);
        manager.on_frame(Instant::now());
        assert_eq!(value(&manager), "b");
        assert_eq!(manager.last_effects(), UpdateEffects::MINIMAL_EDIT | UpdateEffects::CONTENT);
    }

    #[test]
    fn test_edit_between_cr_and_lf_lands_in_place() {
        let (_surface, mut manager) = setup("a\r\n");
        manager.update_content("a\rX\n", None);
        manager.on_frame(Instant::now());
        assert_eq!(value(&manager), "a\rX\n");

        let (_surface, mut manager) = setup("x\r\ny");
        manager.update_content("x\r!\ny", None);
        manager.on_frame(Instant::now());
        assert_eq!(value(&manager), "x\r!\ny");

        // Later edits are computed against what the model holds.
        manager.update_content("x\r!\n\ny", None);
        manager.on_frame(Instant::now());
        assert_eq!(value(&manager), "x\r!\n\ny");
    }

    proptest! {
        #[test]
        fn prop_model_tracks_every_flushed_update(
            updates in prop::collection::vec("[a\r\n\u{e9}\u{1F600}]{0,12}", 1..8),
        ) {
            let (_surface, mut manager) = setup("");
            let mut now = Instant::now();
            for content in updates {
                manager.update_content(content.clone(), None);
                manager.on_frame(now);
                now += FRAME;
                prop_assert_eq!(value(&manager), content);
            }
        }
    }
}
