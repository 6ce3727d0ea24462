//! Managers: Buffer lifecycle and the incremental update policy.
//!
//! A manager owns one view (single or comparison), the frame scheduler
//! for its pending work and the viewport follower of its streamed side.
//!
//! ```text
//! update_content ──► FrameScheduler[Update] ──on_frame──► flush
//!                                                          │
//!        ┌───────────────────────────┬─────────────────────┤
//!        ▼                           ▼                     ▼
//!  language differs           starts with last      anything else
//!  (full replace)             (append fast path)    (minimal edit)
//!        │                           │                     │
//!        └──────────► line count changed? ──► fit height + request reveal
//! ```
//!
//! Appends are applied in the caller's turn; only the bookkeeping that
//! follows them (re-measure, fit, reveal) is batched to the next frame.

mod diff;
mod single;

pub use diff::DiffEditorManager;
pub use single::EditorManager;

use crate::edit::compute_minimal_edit;
use crate::surface::{TextEdit, TextModel, TextRange};
use bitflags::bitflags;

bitflags! {
    /// What an update flush did to a buffer.
    ///
    /// Recorded per flush so callers can observe which path was taken.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UpdateEffects: u8 {
        /// Buffer text changed
        const CONTENT = 0b0000_0001;
        /// Line count changed
        const LINE_COUNT = 0b0000_0010;
        /// Language was reassigned
        const LANGUAGE = 0b0000_0100;
        /// New text was a pure suffix of the old text
        const APPEND_FAST_PATH = 0b0000_1000;
        /// A single minimal range replacement was applied
        const MINIMAL_EDIT = 0b0001_0000;
        /// The whole buffer was replaced
        const FULL_REPLACE = 0b0010_0000;
    }
}

impl std::fmt::Debug for UpdateEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// Scheduler slot of a manager's pending work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Single-buffer content update.
    Update,
    /// Append bookkeeping.
    Append,
    /// Debounced reveal of new content.
    Reveal,
    /// Batched comparison-view update.
    Diff,
}

/// A content update waiting for the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    /// Full new content.
    pub content: String,
    /// Requested language, if any.
    pub language: Option<String>,
}

/// A comparison-view update waiting for the next frame.
///
/// Sides left as `None` are not touched by the flush.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingDiff {
    /// New original content.
    pub original: Option<String>,
    /// New modified content.
    pub modified: Option<String>,
    /// Requested language, if any. A change forces a full replace of both sides.
    pub language: Option<String>,
}

/// Work a manager hands to its frame scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FrameTask<P> {
    /// Flush a pending payload.
    Flush(P),
    /// Append bookkeeping.
    Append,
    /// Poll the follower for a due reveal.
    Reveal,
}

/// Edit turning `prev` (the model's current text) into `next`.
///
/// Offsets of the minimal edit are converted through the model, so `prev`
/// must be what the model holds.
pub(crate) fn minimal_text_edit<M: TextModel>(model: &M, prev: &str, next: &str) -> Option<TextEdit> {
    let edit = compute_minimal_edit(prev, next)?;
    let range = TextRange::new(model.position_at(edit.start), model.position_at(edit.end_prev));
    Some(TextEdit::new(range, edit.replace_text))
}

/// Edit inserting `text` at the end of the model.
pub(crate) fn append_text_edit<M: TextModel>(model: &M, text: &str) -> TextEdit {
    TextEdit::new(TextRange::caret(model.end_position()), text)
}

/// Edit replacing the whole model with `text`.
pub(crate) fn full_text_edit<M: TextModel>(model: &M, text: &str) -> TextEdit {
    TextEdit::new(model.full_range(), text)
}
