//! Surface: The editing-surface collaborator the managers drive.
//!
//! The widget that actually displays and edits text is not part of this
//! crate. Managers talk to it through the traits below:
//!
//! - [`TextModel`]: one buffer with line/column addressing and range edits
//! - [`EditorView`]: a single editor bound to one model
//! - [`DiffView`]: a side-by-side comparison of two models
//! - [`EditorSurface`]: the factory and global theme/language registry
//!
//! Positions are 1-based lines and 1-based byte columns. Offsets are UTF-8
//! byte offsets. Surfaces report scroll and size changes as
//! [`SurfaceEvent`]s over a crossbeam channel; dropping the receiver
//! detaches the listener.
//!
//! [`memory`] provides a headless implementation backed by a rope.

pub mod memory;

use crossbeam_channel::Receiver;
use serde::Deserialize;

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Byte column, starting at 1.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A range between two positions (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    /// Start position.
    pub start: Position,
    /// End position.
    pub end: Position,
}

impl TextRange {
    /// Create a new range.
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Empty range at `position`.
    pub const fn caret(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Check if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A range replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Replaced range.
    pub range: TextRange,
    /// Replacement text.
    pub text: String,
}

impl TextEdit {
    /// Create a new edit.
    pub fn new(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// How a view scrolls a line into sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealStrategy {
    /// Scroll so the line sits at the bottom edge.
    Bottom,
    /// Scroll so the line is centered.
    Center,
    /// Center the line, but only if it is outside the viewport.
    #[default]
    CenterIfOutside,
}

/// Scroll and size introspection of a view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current vertical scroll offset in pixels.
    pub scroll_top: f64,
    /// Total scrollable height in pixels.
    pub scroll_height: f64,
    /// Visible height of the view in pixels.
    pub viewport_height: f64,
    /// Height of one line in pixels.
    pub line_height: f64,
}

/// Events reported by a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// Scroll position changed.
    Scroll {
        /// New scroll offset.
        scroll_top: f64,
        /// Scrollable height at the time of the event.
        scroll_height: f64,
    },
    /// Rendered content height changed.
    ContentSize {
        /// New content height.
        content_height: f64,
    },
    /// Layout (visible height) changed.
    Layout {
        /// New viewport height.
        viewport_height: f64,
    },
}

/// Which side of a comparison view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffSide {
    /// The "before" buffer.
    Original,
    /// The "after" buffer, which receives streamed content.
    Modified,
}

/// Options a surface needs to create a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    /// Initial language id.
    pub language: String,
    /// Theme active at creation.
    pub theme: String,
    /// Whether the view rejects user edits.
    pub read_only: bool,
    /// Upper bound of the fitted view height.
    pub max_height: f64,
}

/// A text buffer with line/column addressing.
pub trait TextModel {
    /// Full content.
    fn value(&self) -> String;

    /// Content length in bytes.
    fn len(&self) -> usize;

    /// Check if the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines (an empty buffer has one line).
    fn line_count(&self) -> usize;

    /// Column just past the last character of `line`.
    fn line_max_column(&self, line: usize) -> usize;

    /// Convert a byte offset to a position. Offsets past the end clamp.
    fn position_at(&self, offset: usize) -> Position;

    /// Convert a position to a byte offset. Positions past the end clamp.
    fn offset_at(&self, position: Position) -> usize;

    /// Apply edits without recording undo history.
    fn apply_edits(&mut self, edits: &[TextEdit]);

    /// Current language id.
    fn language(&self) -> &str;

    /// Reassign the language id.
    fn set_language(&mut self, language: &str);

    /// Release the buffer. Safe to call more than once.
    fn dispose(&mut self);

    /// Position after the last character.
    fn end_position(&self) -> Position {
        let line = self.line_count();
        Position::new(line, self.line_max_column(line))
    }

    /// Range covering the whole buffer.
    fn full_range(&self) -> TextRange {
        TextRange::new(Position::new(1, 1), self.end_position())
    }
}

/// A single editor bound to one model.
pub trait EditorView {
    /// Model type.
    type Model: TextModel;

    /// The bound model.
    fn model(&self) -> &Self::Model;

    /// Mutable access to the bound model.
    fn model_mut(&mut self) -> &mut Self::Model;

    /// Whether the view rejects user edits.
    fn is_read_only(&self) -> bool;

    /// Apply edits through the undo stack.
    fn execute_edits(&mut self, edits: &[TextEdit]);

    /// Current scroll metrics.
    fn scroll_metrics(&self) -> ScrollMetrics;

    /// First and last visible line, if laid out.
    fn visible_line_range(&self) -> Option<(usize, usize)>;

    /// Resize the view.
    fn set_height(&mut self, height: f64);

    /// Scroll `line` into sight.
    fn reveal_line(&mut self, line: usize, strategy: RevealStrategy);

    /// Subscribe to scroll, content-size and layout events.
    fn subscribe(&mut self) -> Receiver<SurfaceEvent>;

    /// Release the view and its container contents. Safe to call more than once.
    fn dispose(&mut self);
}

/// A side-by-side comparison of two models.
pub trait DiffView {
    /// Model type of both sides.
    type Model: TextModel;

    /// The original ("before") model.
    fn original(&self) -> &Self::Model;

    /// Mutable access to the original model.
    fn original_mut(&mut self) -> &mut Self::Model;

    /// The modified ("after") model.
    fn modified(&self) -> &Self::Model;

    /// Mutable access to the modified model.
    fn modified_mut(&mut self) -> &mut Self::Model;

    /// Whether the view rejects user edits.
    fn is_read_only(&self) -> bool;

    /// Apply edits to one side through its undo stack.
    fn execute_edits(&mut self, side: DiffSide, edits: &[TextEdit]);

    /// Scroll metrics of the modified side.
    fn modified_scroll_metrics(&self) -> ScrollMetrics;

    /// Scroll `line` of the modified side into sight.
    fn reveal_modified_line(&mut self, line: usize, strategy: RevealStrategy);

    /// Subscribe to events of the modified side.
    fn subscribe_modified(&mut self) -> Receiver<SurfaceEvent>;

    /// Resize the comparison view.
    fn set_height(&mut self, height: f64);

    /// Release the view and both models. Safe to call more than once.
    fn dispose(&mut self);
}

/// Factory and global registry of the editing surface.
pub trait EditorSurface {
    /// Host container a view is mounted into.
    type Container;
    /// Single editor type.
    type Editor: EditorView;
    /// Comparison view type.
    type DiffEditor: DiffView;
    /// Highlighter type the surface's tokenizer accepts.
    type Highlighter;

    /// Create a single editor.
    fn create_editor(
        &mut self,
        container: Self::Container,
        content: &str,
        options: &ViewOptions,
    ) -> Self::Editor;

    /// Create a comparison view over two fresh models.
    fn create_diff_editor(
        &mut self,
        container: Self::Container,
        original: &str,
        modified: &str,
        options: &ViewOptions,
    ) -> Self::DiffEditor;

    /// Activate a theme globally.
    fn set_theme(&mut self, theme: &str);

    /// Make a language id known to the surface.
    fn register_language(&mut self, language: &str);

    /// Route the surface's tokenizer through `highlighter`.
    fn bind_highlighter(
        &mut self,
        highlighter: &Self::Highlighter,
        themes: &[String],
        languages: &[String],
    );
}
