//! Dual-buffer manager: A comparison view fed on both sides.
//!
//! The modified side carries the streamed content and is the only side the
//! viewport follower watches. The view is sized to the taller side.

use super::{
    append_text_edit, full_text_edit, minimal_text_edit, FrameKind, FrameTask, PendingDiff,
    UpdateEffects,
};
use crate::config::EditorOptions;
use crate::edit::AppendBuffer;
use crate::schedule::FrameScheduler;
use crate::surface::{DiffSide, DiffView, EditorSurface, SurfaceEvent, TextEdit, TextModel, ViewOptions};
use crate::viewport::ViewportFollower;
use crossbeam_channel::Receiver;
use std::time::Instant;
use tracing::{debug, trace, warn};

const TARGET: &str = "stream_editor::diff";

fn side_model<D: DiffView>(view: &D, side: DiffSide) -> &D::Model {
    match side {
        DiffSide::Original => view.original(),
        DiffSide::Modified => view.modified(),
    }
}

fn side_model_mut<D: DiffView>(view: &mut D, side: DiffSide) -> &mut D::Model {
    match side {
        DiffSide::Original => view.original_mut(),
        DiffSide::Modified => view.modified_mut(),
    }
}

fn apply_side_edits<D: DiffView>(view: &mut D, side: DiffSide, edits: &[TextEdit]) {
    if view.is_read_only() {
        side_model_mut(view, side).apply_edits(edits);
    } else {
        view.execute_edits(side, edits);
    }
}

/// Owns a comparison view and keeps both of its models in sync.
///
/// [`update_diff`](Self::update_diff) applies pure appends right away and
/// batches everything else to the next frame. The single-sided entry points
/// apply immediately.
pub struct DiffEditorManager<D: DiffView> {
    /// Configuration.
    options: EditorOptions,
    /// The managed comparison view, once created.
    editor: Option<D>,
    /// Modified-side scroll/size listener; `None` while detached.
    events: Option<Receiver<SurfaceEvent>>,
    /// Work waiting for the next frame.
    scheduler: FrameScheduler<FrameKind, FrameTask<PendingDiff>>,
    /// Auto-scroll state of the modified side.
    follower: ViewportFollower,
    /// Original content as of the last applied update.
    last_original: String,
    /// Modified content as of the last applied update.
    last_modified: String,
    /// Modified-side fragments appended since the last append flush.
    appends: AppendBuffer,
    /// Time of the last batched flush (for throttling).
    last_flush: Option<Instant>,
    /// Effects of the last update that did anything.
    last_effects: UpdateEffects,
    /// Height the view was last fitted to.
    height: f64,
}

impl<D: DiffView> std::fmt::Debug for DiffEditorManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffEditorManager")
            .field("created", &self.editor.is_some())
            .field("listening", &self.events.is_some())
            .field("scheduler", &self.scheduler)
            .field("follower", &self.follower.state())
            .field("last_effects", &self.last_effects)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl<D: DiffView> DiffEditorManager<D> {
    /// Create a manager with no view.
    pub fn new(options: EditorOptions) -> Self {
        let follower = ViewportFollower::new(options.diff_follow_options());
        Self {
            options,
            editor: None,
            events: None,
            scheduler: FrameScheduler::new(),
            follower,
            last_original: String::new(),
            last_modified: String::new(),
            appends: AppendBuffer::new(),
            last_flush: None,
            last_effects: UpdateEffects::empty(),
            height: 0.0,
        }
    }

    /// Create the comparison view, replacing any previous one.
    pub fn create<S>(
        &mut self,
        surface: &mut S,
        container: S::Container,
        original: &str,
        modified: &str,
        language: &str,
        theme: &str,
    ) where
        S: EditorSurface<DiffEditor = D>,
    {
        self.cleanup();

        let view_options = ViewOptions {
            language: language.to_owned(),
            theme: theme.to_owned(),
            read_only: self.options.read_only,
            max_height: self.options.max_height,
        };
        let mut editor = surface.create_diff_editor(container, original, modified, &view_options);
        self.events = Some(editor.subscribe_modified());
        self.follower
            .sync_metrics(editor.modified_scroll_metrics(), editor.modified().line_count());
        original.clone_into(&mut self.last_original);
        modified.clone_into(&mut self.last_modified);
        self.editor = Some(editor);
        self.fit_height();

        debug!(
            target: TARGET,
            language,
            theme,
            height = self.height,
            "diff_editor_created"
        );
    }

    /// The managed comparison view.
    pub const fn view(&self) -> Option<&D> {
        self.editor.as_ref()
    }

    /// Mutable access to the managed comparison view.
    pub fn view_mut(&mut self) -> Option<&mut D> {
        self.editor.as_mut()
    }

    /// The original model.
    pub fn original_model(&self) -> Option<&D::Model> {
        self.editor.as_ref().map(DiffView::original)
    }

    /// The modified model.
    pub fn modified_model(&self) -> Option<&D::Model> {
        self.editor.as_ref().map(DiffView::modified)
    }

    /// Current language of the view.
    pub fn language(&self) -> Option<&str> {
        self.modified_model().map(TextModel::language)
    }

    /// Effects of the most recent update that changed something.
    pub const fn last_effects(&self) -> UpdateEffects {
        self.last_effects
    }

    /// The modified side's viewport follower.
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

    /// Update both sides.
    ///
    /// A language change batches a full replace of both sides. Otherwise
    /// each side that is a pure append of its last content is applied now,
    /// and the others are batched to the next frame. A side that already
    /// waits for the frame keeps waiting with the newer value.
    pub fn update_diff(
        &mut self,
        original: impl Into<String>,
        modified: impl Into<String>,
        language: Option<&str>,
    ) {
        self.ensure_listener();
        let (original, modified) = (original.into(), modified.into());

        let language_changed = language.is_some_and(|lang| self.language() != Some(lang));
        if language_changed || self.editor.is_none() {
            let pending = PendingDiff {
                original: Some(original),
                modified: Some(modified),
                language: language.map(str::to_owned),
            };
            self.scheduler.schedule(FrameKind::Diff, FrameTask::Flush(pending));
            return;
        }

        let mut pending = self.take_pending().unwrap_or_default();
        let mut effects = self.route_side(DiffSide::Original, original, &mut pending);
        effects |= self.route_side(DiffSide::Modified, modified, &mut pending);

        if pending.original.is_some() || pending.modified.is_some() || pending.language.is_some() {
            self.scheduler.schedule(FrameKind::Diff, FrameTask::Flush(pending));
        }
        if !effects.is_empty() {
            self.last_effects = effects;
        }
    }

    /// Update the original side now (append fast path, else minimal edit).
    pub fn update_original(&mut self, content: impl Into<String>) -> UpdateEffects {
        self.update_side_now(DiffSide::Original, content.into())
    }

    /// Update the modified side now (append fast path, else minimal edit).
    pub fn update_modified(&mut self, content: impl Into<String>) -> UpdateEffects {
        self.update_side_now(DiffSide::Modified, content.into())
    }

    /// Append `text` to the original side now.
    pub fn append_original(&mut self, text: &str) {
        self.ensure_listener();
        self.append_side(DiffSide::Original, text);
    }

    /// Append `text` to the modified side now and let the follower react on
    /// the next frame.
    pub fn append_modified(&mut self, text: &str) {
        self.ensure_listener();
        self.append_side(DiffSide::Modified, text);
    }

    /// Switch both sides to `language` if it is in `allowed`.
    pub fn set_language(&mut self, language: &str, allowed: &[String]) -> bool {
        if !allowed.iter().any(|lang| lang == language) {
            warn!(target: TARGET, language, "language_not_allowed");
            return false;
        }
        let Some(editor) = self.editor.as_mut() else {
            debug!(target: TARGET, language, "set_language_without_editor");
            return false;
        };
        for side in [DiffSide::Original, DiffSide::Modified] {
            let model = side_model_mut(editor, side);
            if model.language() != language {
                model.set_language(language);
            }
        }
        debug!(target: TARGET, language, "language_changed");
        true
    }

    /// Run one frame: drain surface events, then flush everything
    /// scheduled before this tick.
    pub fn on_frame(&mut self, now: Instant) -> UpdateEffects {
        self.pump_events();

        let mut effects = UpdateEffects::empty();
        for (_, task) in self.scheduler.take_frame() {
            effects |= match task {
                FrameTask::Flush(pending) => self.flush_diff(pending, now),
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

    /// Cancel all work, dispose the view and both models, reset state.
    pub fn cleanup(&mut self) {
        self.scheduler.cancel_all();
        self.appends.clear();
        self.events = None;
        if let Some(mut editor) = self.editor.take() {
            editor.dispose();
            debug!(target: TARGET, "diff_editor_disposed");
        }
        self.follower.clear();
        self.last_original.clear();
        self.last_modified.clear();
        self.last_flush = None;
        self.last_effects = UpdateEffects::empty();
        self.height = 0.0;
    }

    /// Cancel pending work and reset auto-scroll state, keeping the view.
    pub fn safe_clean(&mut self) {
        self.scheduler.cancel_all();
        self.appends.clear();
        self.events = None;
        self.follower.reset();
        self.last_flush = None;
        debug!(target: TARGET, "diff_editor_safe_cleaned");
    }

    fn last(&self, side: DiffSide) -> &str {
        match side {
            DiffSide::Original => &self.last_original,
            DiffSide::Modified => &self.last_modified,
        }
    }

    fn last_mut(&mut self, side: DiffSide) -> &mut String {
        match side {
            DiffSide::Original => &mut self.last_original,
            DiffSide::Modified => &mut self.last_modified,
        }
    }

    fn ensure_listener(&mut self) {
        if self.events.is_some() {
            return;
        }
        if let Some(editor) = self.editor.as_mut() {
            self.events = Some(editor.subscribe_modified());
            self.follower
                .sync_metrics(editor.modified_scroll_metrics(), editor.modified().line_count());
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

    /// Take the payload of a pending batched flush out of the scheduler.
    fn take_pending(&mut self) -> Option<PendingDiff> {
        let pending = match self.scheduler.pending_mut(&FrameKind::Diff)? {
            FrameTask::Flush(pending) => std::mem::take(pending),
            FrameTask::Append | FrameTask::Reveal => return None,
        };
        self.scheduler.cancel(&FrameKind::Diff);
        Some(pending)
    }

    /// Apply `text` to `side` now if that is a pure append, otherwise store
    /// it in `pending`.
    fn route_side(&mut self, side: DiffSide, text: String, pending: &mut PendingDiff) -> UpdateEffects {
        let forced = pending.language.is_some();
        let slot = match side {
            DiffSide::Original => &mut pending.original,
            DiffSide::Modified => &mut pending.modified,
        };
        if forced || slot.is_some() {
            *slot = Some(text);
            return UpdateEffects::empty();
        }
        if text == self.last(side) {
            return UpdateEffects::empty();
        }
        if let Some(suffix) = text.strip_prefix(self.last(side)) {
            self.append_side(side, suffix);
            return UpdateEffects::APPEND_FAST_PATH | UpdateEffects::CONTENT;
        }
        *slot = Some(text);
        UpdateEffects::empty()
    }

    fn update_side_now(&mut self, side: DiffSide, text: String) -> UpdateEffects {
        self.ensure_listener();
        // A newer value supersedes whatever this side had batched.
        if let Some(FrameTask::Flush(pending)) = self.scheduler.pending_mut(&FrameKind::Diff) {
            match side {
                DiffSide::Original => pending.original = None,
                DiffSide::Modified => pending.modified = None,
            }
        }
        let effects = self.apply_side(side, text);
        if !effects.is_empty() {
            self.last_effects = effects;
        }
        effects
    }

    /// Bring `side` to `text`, measuring line-count changes.
    fn apply_side(&mut self, side: DiffSide, text: String) -> UpdateEffects {
        let Some(lines_before) = self.editor.as_ref().map(|e| side_model(e, side).line_count()) else {
            trace!(target: TARGET, ?side, "update_without_editor");
            return UpdateEffects::empty();
        };
        if text == self.last(side) {
            return UpdateEffects::empty();
        }
        if let Some(suffix) = text.strip_prefix(self.last(side)) {
            self.append_side(side, suffix);
            return UpdateEffects::APPEND_FAST_PATH | UpdateEffects::CONTENT;
        }

        let mut effects = self.apply_minimal(side, text);
        let lines = self
            .editor
            .as_ref()
            .map_or(lines_before, |e| side_model(e, side).line_count());
        if lines != lines_before {
            effects |= UpdateEffects::LINE_COUNT;
            match side {
                DiffSide::Original => {
                    self.fit_height();
                }
                DiffSide::Modified => self.on_line_count_changed(lines),
            }
        }
        effects
    }

    fn apply_minimal(&mut self, side: DiffSide, text: String) -> UpdateEffects {
        let Some(editor) = self.editor.as_mut() else {
            return UpdateEffects::empty();
        };
        let last = match side {
            DiffSide::Original => &self.last_original,
            DiffSide::Modified => &self.last_modified,
        };
        let Some(edit) = minimal_text_edit(side_model(editor, side), last, &text) else {
            return UpdateEffects::empty();
        };
        trace!(target: TARGET, ?side, bytes = edit.text.len(), "side_minimal_edit");
        apply_side_edits(editor, side, &[edit]);
        *self.last_mut(side) = text;
        UpdateEffects::MINIMAL_EDIT | UpdateEffects::CONTENT
    }

    fn append_side(&mut self, side: DiffSide, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(editor) = self.editor.as_mut() else {
            trace!(target: TARGET, ?side, "append_without_editor");
            return;
        };
        let edit = append_text_edit(side_model(editor, side), text);
        apply_side_edits(editor, side, &[edit]);
        self.last_mut(side).push_str(text);

        match side {
            DiffSide::Original => {
                self.fit_height();
            }
            DiffSide::Modified => {
                self.appends.push(text);
                self.scheduler.schedule(FrameKind::Append, FrameTask::Append);
            }
        }
    }

    fn flush_diff(&mut self, pending: PendingDiff, now: Instant) -> UpdateEffects {
        if let Some(last) = self.last_flush {
            if now.saturating_duration_since(last) < self.options.update_throttle() {
                self.scheduler.schedule(FrameKind::Diff, FrameTask::Flush(pending));
                return UpdateEffects::empty();
            }
        }
        let Some(current) = self.language().map(str::to_owned) else {
            trace!(target: TARGET, "diff_without_editor");
            return UpdateEffects::empty();
        };
        self.last_flush = Some(now);

        let effects = match pending.language.filter(|language| *language != current) {
            Some(language) => self.replace_both(&language, pending.original, pending.modified),
            None => {
                let mut effects = UpdateEffects::empty();
                if let Some(original) = pending.original {
                    effects |= self.apply_side(DiffSide::Original, original);
                }
                if let Some(modified) = pending.modified {
                    effects |= self.apply_side(DiffSide::Modified, modified);
                }
                effects
            }
        };
        debug!(target: TARGET, effects = ?effects, "diff_flushed");
        effects
    }

    fn replace_both(
        &mut self,
        language: &str,
        original: Option<String>,
        modified: Option<String>,
    ) -> UpdateEffects {
        let Some(editor) = self.editor.as_mut() else {
            return UpdateEffects::empty();
        };
        let modified_lines = editor.modified().line_count();
        let contents = [(DiffSide::Original, original), (DiffSide::Modified, modified)];
        for (side, text) in contents {
            let text = text.unwrap_or_else(|| match side {
                DiffSide::Original => self.last_original.clone(),
                DiffSide::Modified => self.last_modified.clone(),
            });
            side_model_mut(editor, side).set_language(language);
            let edit = full_text_edit(side_model(editor, side), &text);
            apply_side_edits(editor, side, &[edit]);
            match side {
                DiffSide::Original => self.last_original = text,
                DiffSide::Modified => self.last_modified = text,
            }
        }
        debug!(target: TARGET, language, "diff_full_replace");

        let mut effects = UpdateEffects::LANGUAGE | UpdateEffects::FULL_REPLACE | UpdateEffects::CONTENT;
        let lines = editor.modified().line_count();
        if lines == modified_lines {
            self.fit_height();
        } else {
            effects |= UpdateEffects::LINE_COUNT;
            self.on_line_count_changed(lines);
        }
        effects
    }

    fn flush_append(&mut self) -> UpdateEffects {
        let Some(batch) = self.appends.flush() else {
            return UpdateEffects::empty();
        };
        let Some(lines) = self.modified_model().map(TextModel::line_count) else {
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
                    editor.reveal_modified_line(request.line, request.strategy);
                    debug!(target: TARGET, line = request.line, "modified_line_revealed");
                }
            }
            None if self.follower.has_pending_reveal() => {
                self.scheduler.schedule(FrameKind::Reveal, FrameTask::Reveal);
            }
            None => {}
        }
    }

    /// Resize the view to the taller side. Returns `true` if the height changed.
    #[allow(clippy::cast_precision_loss)]
    fn fit_height(&mut self) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        let lines = editor.original().line_count().max(editor.modified().line_count());
        let content = lines as f64 * self.follower.metrics().line_height;
        let height = (content + self.options.height_padding).min(self.options.max_height);
        if (height - self.height).abs() <= f64::EPSILON {
            return false;
        }
        self.height = height;
        editor.set_height(height);
        self.follower.set_viewport_height(height);
        true
    }
}

impl<D: DiffView> Drop for DiffEditorManager<D> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
