//! In-memory surface: A headless editing surface backed by a rope.
//!
//! Implements every surface trait with simple pixel geometry (fixed line
//! height, view height set by the manager). Useful for tests, benches and
//! hosts that only need the synchronized text.

use super::{
    DiffSide, DiffView, EditorSurface, EditorView, Position, RevealStrategy, ScrollMetrics,
    SurfaceEvent, TextEdit, TextModel, TextRange, ViewOptions,
};
use crate::highlight::{HighlightError, HighlighterFactory};
use crossbeam_channel::{unbounded, Receiver, Sender};
use futures::future::{self, FutureExt, LocalBoxFuture};
use ropey::Rope;
use std::cell::Cell;
use std::rc::Rc;

/// Default line height of the in-memory surface.
pub const DEFAULT_LINE_HEIGHT: f64 = 18.0;

/// Event subscribers; disconnected receivers are pruned on send.
#[derive(Debug, Default)]
struct Watchers(Vec<Sender<SurfaceEvent>>);

impl Watchers {
    fn add(&mut self) -> Receiver<SurfaceEvent> {
        let (tx, rx) = unbounded();
        self.0.push(tx);
        rx
    }

    fn share(&mut self, tx: Sender<SurfaceEvent>) {
        self.0.push(tx);
    }

    fn emit(&mut self, event: SurfaceEvent) {
        self.0.retain(|tx| tx.send(event).is_ok());
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// A rope-backed text model.
#[derive(Debug)]
pub struct MemoryModel {
    rope: Rope,
    language: String,
    line_height: f64,
    watchers: Watchers,
    edit_log: Vec<TextEdit>,
    disposed: bool,
}

impl MemoryModel {
    /// Create a model with the given content and language.
    pub fn new(content: &str, language: &str) -> Self {
        Self::with_line_height(content, language, DEFAULT_LINE_HEIGHT)
    }

    /// Create a model with a custom line height for content-size events.
    pub fn with_line_height(content: &str, language: &str, line_height: f64) -> Self {
        Self {
            rope: Rope::from_str(content),
            language: language.to_owned(),
            line_height,
            watchers: Watchers::default(),
            edit_log: Vec::new(),
            disposed: false,
        }
    }

    /// Every edit applied so far, in order.
    pub fn edit_log(&self) -> &[TextEdit] {
        &self.edit_log
    }

    /// Check if the model was disposed.
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_byte(line - 1)
    }

    fn clamp_line(&self, line: usize) -> usize {
        line.clamp(1, self.line_count())
    }

    fn content_height(&self) -> f64 {
        self.line_count() as f64 * self.line_height
    }
}

#[allow(clippy::cast_precision_loss)]
impl TextModel for MemoryModel {
    fn value(&self) -> String {
        self.rope.to_string()
    }

    fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_max_column(&self, line: usize) -> usize {
        let line = self.clamp_line(line);
        let start = self.line_start(line);
        let mut end = if line < self.line_count() {
            self.rope.line_to_byte(line)
        } else {
            self.rope.len_bytes()
        };
        if end > start && self.rope.byte(end - 1) == b'\n' {
            end -= 1;
        }
        if end > start && self.rope.byte(end - 1) == b'\r' {
            end -= 1;
        }
        end - start + 1
    }

    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_bytes());
        let line_idx = self.rope.byte_to_line(offset);
        Position::new(line_idx + 1, offset - self.rope.line_to_byte(line_idx) + 1)
    }

    fn offset_at(&self, position: Position) -> usize {
        let line = self.clamp_line(position.line);
        let start = self.line_start(line);
        // Columns may address bytes inside the line terminator (between
        // `\r` and `\n`), so clamp to the full line span.
        let end = if line < self.line_count() {
            self.rope.line_to_byte(line)
        } else {
            self.rope.len_bytes()
        };
        start + (position.column.max(1) - 1).min(end - start)
    }

    fn apply_edits(&mut self, edits: &[TextEdit]) {
        if self.disposed || edits.is_empty() {
            return;
        }
        let lines_before = self.line_count();

        // Resolve against the unedited text, then apply back to front.
        let mut resolved: Vec<(usize, usize, &str)> = edits
            .iter()
            .map(|edit| {
                let start = self.offset_at(edit.range.start);
                let end = self.offset_at(edit.range.end).max(start);
                (start, end, edit.text.as_str())
            })
            .collect();
        resolved.sort_by(|a, b| b.0.cmp(&a.0));

        for (start, end, text) in resolved {
            let start_char = self.rope.byte_to_char(start);
            let end_char = self.rope.byte_to_char(end);
            self.rope.remove(start_char..end_char);
            self.rope.insert(start_char, text);
        }
        self.edit_log.extend_from_slice(edits);

        if self.line_count() != lines_before {
            let content_height = self.content_height();
            self.watchers.emit(SurfaceEvent::ContentSize { content_height });
        }
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn set_language(&mut self, language: &str) {
        language.clone_into(&mut self.language);
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.watchers.clear();
    }
}

/// Shared scroll geometry of a single view.
#[derive(Debug)]
struct Viewport {
    height: f64,
    scroll_top: f64,
    line_height: f64,
    reveals: Vec<(usize, RevealStrategy)>,
    watchers: Watchers,
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
impl Viewport {
    const fn new(line_height: f64) -> Self {
        Self {
            height: 0.0,
            scroll_top: 0.0,
            line_height,
            reveals: Vec::new(),
            watchers: Watchers(Vec::new()),
        }
    }

    fn scroll_height(&self, line_count: usize) -> f64 {
        (line_count as f64 * self.line_height).max(self.height)
    }

    fn metrics(&self, line_count: usize) -> ScrollMetrics {
        let scroll_height = self.scroll_height(line_count);
        ScrollMetrics {
            scroll_top: self.scroll_top.min(scroll_height - self.height).max(0.0),
            scroll_height,
            viewport_height: self.height,
            line_height: self.line_height,
        }
    }

    fn visible_range(&self, line_count: usize) -> Option<(usize, usize)> {
        if self.height <= 0.0 {
            return None;
        }
        let top = self.metrics(line_count).scroll_top;
        let first = (top / self.line_height).floor() as usize + 1;
        let last = ((top + self.height) / self.line_height).ceil() as usize;
        Some((first.min(line_count), last.clamp(first, line_count.max(first))))
    }

    fn scroll_to(&mut self, top: f64, line_count: usize) {
        let scroll_height = self.scroll_height(line_count);
        let top = top.clamp(0.0, (scroll_height - self.height).max(0.0));
        if (top - self.scroll_top).abs() > f64::EPSILON {
            self.scroll_top = top;
            self.watchers.emit(SurfaceEvent::Scroll {
                scroll_top: top,
                scroll_height,
            });
        }
    }

    fn reveal(&mut self, line: usize, strategy: RevealStrategy, line_count: usize) {
        self.reveals.push((line, strategy));
        let line_top = (line.saturating_sub(1)) as f64 * self.line_height;
        let target = match strategy {
            RevealStrategy::Bottom => line_top + self.line_height - self.height,
            RevealStrategy::Center => line_top - (self.height - self.line_height) / 2.0,
            RevealStrategy::CenterIfOutside => {
                if let Some((first, last)) = self.visible_range(line_count) {
                    if (first..=last).contains(&line) {
                        return;
                    }
                }
                line_top - (self.height - self.line_height) / 2.0
            }
        };
        self.scroll_to(target, line_count);
    }

    fn set_height(&mut self, height: f64) {
        if (height - self.height).abs() > f64::EPSILON {
            self.height = height;
            self.watchers.emit(SurfaceEvent::Layout {
                viewport_height: height,
            });
        }
    }
}

/// A headless single editor.
#[derive(Debug)]
pub struct MemoryEditor {
    container: String,
    model: MemoryModel,
    read_only: bool,
    viewport: Viewport,
    undo_stack: Vec<Vec<TextEdit>>,
    disposed: bool,
}

impl MemoryEditor {
    /// Name of the container the editor is mounted in.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Current view height.
    pub const fn height(&self) -> f64 {
        self.viewport.height
    }

    /// Reveal requests received, in order.
    pub fn reveals(&self) -> &[(usize, RevealStrategy)] {
        &self.viewport.reveals
    }

    /// Edit batches recorded on the undo stack.
    pub fn undo_stack(&self) -> &[Vec<TextEdit>] {
        &self.undo_stack
    }

    /// Check if the editor was disposed.
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Simulate a user scroll to `scroll_top`.
    pub fn scroll_to(&mut self, scroll_top: f64) {
        let lines = self.model.line_count();
        self.viewport.scroll_to(scroll_top, lines);
    }
}

impl EditorView for MemoryEditor {
    type Model = MemoryModel;

    fn model(&self) -> &MemoryModel {
        &self.model
    }

    fn model_mut(&mut self) -> &mut MemoryModel {
        &mut self.model
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn execute_edits(&mut self, edits: &[TextEdit]) {
        if self.disposed {
            return;
        }
        self.model.apply_edits(edits);
        self.undo_stack.push(edits.to_vec());
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.viewport.metrics(self.model.line_count())
    }

    fn visible_line_range(&self) -> Option<(usize, usize)> {
        self.viewport.visible_range(self.model.line_count())
    }

    fn set_height(&mut self, height: f64) {
        self.viewport.set_height(height);
    }

    fn reveal_line(&mut self, line: usize, strategy: RevealStrategy) {
        let lines = self.model.line_count();
        self.viewport.reveal(line, strategy, lines);
    }

    fn subscribe(&mut self) -> Receiver<SurfaceEvent> {
        let rx = self.viewport.watchers.add();
        if let Some(tx) = self.viewport.watchers.0.last().cloned() {
            self.model.watchers.share(tx);
        }
        rx
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.viewport.watchers.clear();
        self.model.dispose();
    }
}

/// A headless comparison view.
#[derive(Debug)]
pub struct MemoryDiffEditor {
    container: String,
    original: MemoryModel,
    modified: MemoryModel,
    read_only: bool,
    viewport: Viewport,
    original_undo: Vec<Vec<TextEdit>>,
    modified_undo: Vec<Vec<TextEdit>>,
    disposed: bool,
}

impl MemoryDiffEditor {
    /// Name of the container the view is mounted in.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Current view height.
    pub const fn height(&self) -> f64 {
        self.viewport.height
    }

    /// Reveal requests received for the modified side.
    pub fn reveals(&self) -> &[(usize, RevealStrategy)] {
        &self.viewport.reveals
    }

    /// Edit batches recorded on the undo stack of `side`.
    pub fn undo_stack(&self, side: DiffSide) -> &[Vec<TextEdit>] {
        match side {
            DiffSide::Original => &self.original_undo,
            DiffSide::Modified => &self.modified_undo,
        }
    }

    /// Check if the view was disposed.
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Simulate a user scroll of the modified side.
    pub fn scroll_modified_to(&mut self, scroll_top: f64) {
        let lines = self.modified.line_count();
        self.viewport.scroll_to(scroll_top, lines);
    }
}

impl DiffView for MemoryDiffEditor {
    type Model = MemoryModel;

    fn original(&self) -> &MemoryModel {
        &self.original
    }

    fn original_mut(&mut self) -> &mut MemoryModel {
        &mut self.original
    }

    fn modified(&self) -> &MemoryModel {
        &self.modified
    }

    fn modified_mut(&mut self) -> &mut MemoryModel {
        &mut self.modified
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn execute_edits(&mut self, side: DiffSide, edits: &[TextEdit]) {
        if self.disposed {
            return;
        }
        let (model, undo) = match side {
            DiffSide::Original => (&mut self.original, &mut self.original_undo),
            DiffSide::Modified => (&mut self.modified, &mut self.modified_undo),
        };
        model.apply_edits(edits);
        undo.push(edits.to_vec());
    }

    fn modified_scroll_metrics(&self) -> ScrollMetrics {
        self.viewport.metrics(self.modified.line_count())
    }

    fn reveal_modified_line(&mut self, line: usize, strategy: RevealStrategy) {
        let lines = self.modified.line_count();
        self.viewport.reveal(line, strategy, lines);
    }

    fn subscribe_modified(&mut self) -> Receiver<SurfaceEvent> {
        let rx = self.viewport.watchers.add();
        if let Some(tx) = self.viewport.watchers.0.last().cloned() {
            self.modified.watchers.share(tx);
        }
        rx
    }

    fn set_height(&mut self, height: f64) {
        self.viewport.set_height(height);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.viewport.watchers.clear();
        self.original.dispose();
        self.modified.dispose();
    }
}

/// Highlighter produced by [`MemoryHighlighterFactory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHighlighter {
    /// Themes the highlighter was built for.
    pub themes: Vec<String>,
    /// Languages the highlighter was built for.
    pub languages: Vec<String>,
}

/// Highlighter factory resolving immediately; counts constructions and can
/// be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighlighterFactory {
    created: Rc<Cell<usize>>,
    fail_next: Rc<Cell<bool>>,
}

impl MemoryHighlighterFactory {
    /// Create a factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constructions started.
    pub fn created(&self) -> usize {
        self.created.get()
    }

    /// Make the next construction fail.
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }
}

impl HighlighterFactory for MemoryHighlighterFactory {
    type Highlighter = MemoryHighlighter;

    fn create(
        &self,
        themes: &[String],
        languages: &[String],
    ) -> LocalBoxFuture<'static, Result<MemoryHighlighter, HighlightError>> {
        self.created.set(self.created.get() + 1);
        if self.fail_next.replace(false) {
            return future::ready(Err(HighlightError::new("highlighter construction failed")))
                .boxed_local();
        }
        future::ready(Ok(MemoryHighlighter {
            themes: themes.to_vec(),
            languages: languages.to_vec(),
        }))
        .boxed_local()
    }
}

/// A headless surface creating [`MemoryEditor`]s.
#[derive(Debug)]
pub struct MemorySurface {
    line_height: f64,
    theme: Option<String>,
    languages: Vec<String>,
    bindings: Vec<MemoryHighlighter>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Create a surface with the default line height.
    pub const fn new() -> Self {
        Self::with_line_height(DEFAULT_LINE_HEIGHT)
    }

    /// Create a surface with a custom line height.
    pub const fn with_line_height(line_height: f64) -> Self {
        Self {
            line_height,
            theme: None,
            languages: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// The globally active theme.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Languages registered so far.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Highlighters bound so far, in order.
    pub fn bindings(&self) -> &[MemoryHighlighter] {
        &self.bindings
    }
}

impl EditorSurface for MemorySurface {
    type Container = String;
    type Editor = MemoryEditor;
    type DiffEditor = MemoryDiffEditor;
    type Highlighter = MemoryHighlighter;

    fn create_editor(&mut self, container: String, content: &str, options: &ViewOptions) -> MemoryEditor {
        MemoryEditor {
            container,
            model: MemoryModel::with_line_height(content, &options.language, self.line_height),
            read_only: options.read_only,
            viewport: Viewport::new(self.line_height),
            undo_stack: Vec::new(),
            disposed: false,
        }
    }

    fn create_diff_editor(
        &mut self,
        container: String,
        original: &str,
        modified: &str,
        options: &ViewOptions,
    ) -> MemoryDiffEditor {
        MemoryDiffEditor {
            container,
            original: MemoryModel::with_line_height(original, &options.language, self.line_height),
            modified: MemoryModel::with_line_height(modified, &options.language, self.line_height),
            read_only: options.read_only,
            viewport: Viewport::new(self.line_height),
            original_undo: Vec::new(),
            modified_undo: Vec::new(),
            disposed: false,
        }
    }

    fn set_theme(&mut self, theme: &str) {
        self.theme = Some(theme.to_owned());
    }

    fn register_language(&mut self, language: &str) {
        if !self.languages.iter().any(|l| l == language) {
            self.languages.push(language.to_owned());
        }
    }

    fn bind_highlighter(&mut self, highlighter: &MemoryHighlighter, _themes: &[String], _languages: &[String]) {
        self.bindings.push(highlighter.clone());
    }
}
